//! Command execution against the backend

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use flat_api::ApiClient;
use flat_core::articles::plain_text;
use flat_core::filter::{self, active_summary, FilterCriteria};
use flat_core::forms;
use flat_core::{
    AppConfig, AppState, Article, Card, CardContext, CurrentUser, DetailOutcome, DetailView,
    FavoriteAction, FavoriteTarget, FavoriteToggle, Gallery, ListPage, ListingKind,
    NeighbourFilters, NewListing, Optimistic, Page, Profile, ProfileEditor, PropertyFilters,
    ToggleEffect, Unfiltered,
};

use crate::cli::{Command, ListArgs, ProfileArgs, PublishArgs, HELP};
use crate::session_store;

/// Build criteria from `field=value` pairs
fn parse_filters<C: FilterCriteria>(pairs: &[String]) -> Result<C> {
    let criteria = pairs
        .iter()
        .try_fold(C::default(), |criteria, pair| filter::apply_pair(&criteria, pair))?;
    Ok(criteria)
}

/// Map a backend page onto cards
fn cards<T>(page: Page<T>) -> Page<Card>
where
    for<'a> Card: From<&'a T>,
{
    Page {
        results: page.results.iter().map(Card::from).collect(),
        total_pages: page.total_pages,
    }
}

fn prepare<C: FilterCriteria>(list: &mut ListPage<C, Card>, args: &ListArgs) -> Result<()> {
    list.set_search(args.search.clone());
    list.replace_filters(parse_filters(&args.filters)?);
    list.set_page(args.page);
    Ok(())
}

/// Listing body from the publish options
fn new_listing(args: &PublishArgs) -> NewListing {
    NewListing {
        kind: args.kind,
        title: args.title.clone(),
        description: args.description.clone(),
        price: args.price,
        region: args.region.clone(),
        address: args.address.clone(),
        size: args.size,
        rooms: args.rooms,
        beds: args.beds,
        has_roommates: args.has_roommates,
        rental_period: args.rental_period,
        amenities: args.amenities.clone(),
        internet: args.internet,
        utilities: args.utilities,
        pets_allowed: args.pets_allowed,
        smoking_allowed: args.smoking_allowed,
        move_in_date: args.move_in_date,
    }
}

fn format_card(card: &Card) -> String {
    let mark = if card.is_favorite { "*" } else { " " };
    let price = card
        .price
        .as_ref()
        .map(|p| format!("{} Kč", p))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} #{:<6} {:<9} {} | {} | {}",
        mark, card.id, card.kind, card.title, price, card.address
    )
}

fn print_list<C: FilterCriteria>(list: &ListPage<C, Card>) -> Result<()> {
    if let Some(error) = list.error() {
        bail!("{}", error);
    }

    let chips = active_summary(list.filters());
    if !chips.is_empty() {
        let chips: Vec<String> = chips.iter().map(|(f, v)| format!("{}: {}", f, v)).collect();
        println!("Filters: {}", chips.join(" · "));
    }

    if list.items().is_empty() {
        println!("Nothing found.");
    }
    for card in list.items() {
        println!("{}", format_card(card));
    }
    println!("Page {} / {}", list.page(), list.total_pages());
    Ok(())
}

fn print_detail(view: &DetailView, gallery: &Gallery) {
    println!("{} #{} {}", view.kind, view.id, view.title);
    if let Some(price) = &view.price {
        println!("Price: {} Kč", price);
    }
    if !view.address.is_empty() {
        println!("Address: {}", view.address);
    }
    let facts: Vec<String> = [("m²", view.size), ("rooms", view.rooms), ("beds", view.beds)]
        .into_iter()
        .filter_map(|(label, v)| v.map(|v| format!("{} {}", v, label)))
        .collect();
    if !facts.is_empty() {
        println!("{}", facts.join(", "));
    }
    if !view.languages.is_empty() {
        println!("Languages: {}", view.languages.join(", "));
    }
    if !view.badges.is_empty() {
        println!("[{}]", view.badges.join("] ["));
    }
    if !view.description.is_empty() {
        println!("\n{}\n", view.description);
    }
    for contact in [&view.contact_phone, &view.contact_email].into_iter().flatten() {
        println!("Contact: {}", contact);
    }

    let position = gallery.position_label().unwrap_or_default();
    println!("Image: {} {}", gallery.current_or_default(), position);
    if view.is_favorite {
        println!("In your favorites");
    }
}

fn print_profile(profile: &Profile) {
    println!("{}", if profile.name.is_empty() { "(no name)" } else { profile.name.as_str() });
    if let Some(age) = profile.age {
        println!("Age: {}", age);
    }
    if let Some(city) = profile.city.as_deref() {
        println!("City: {}", flat_core::region_value_to_label(Some(city)));
    }
    if !profile.languages.is_empty() {
        println!("Languages: {}", profile.languages.join(", "));
    }
    if let Some(about) = profile.about.as_deref().filter(|a| !a.is_empty()) {
        println!("About: {}", about);
    }
    println!("Photo: {}", flat_core::image_or_default(Some(&profile.photo)));
}

fn print_article(article: &Article, lang: &str) {
    println!("{}", article.title);
    if !article.subtitle.is_empty() {
        println!("{}", article.subtitle);
    }
    if !article.date.is_empty() {
        println!("{}", article.date);
    }
    if let Some(image) = article.image.as_deref() {
        println!("Image: {}", image);
    }
    println!("\n{}", plain_text(article.content.get(lang)));
}

pub struct App {
    state: AppState,
    api: ApiClient,
    cookie_path: PathBuf,
}

impl App {
    /// Build the client, restore saved cookies and ask who is logged in
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let cookie_path = session_store::cookie_path();
        if let Err(e) = session_store::load_into(&cookie_path, &api) {
            tracing::warn!("Failed to load session cookies: {}", e);
        }

        let state = AppState::bootstrap(config, &api).await;
        Ok(Self {
            state,
            api,
            cookie_path,
        })
    }

    fn require_login(&self) -> Result<CurrentUser> {
        Ok(self.state.session.read().require_user()?.clone())
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Help => {
                print!("{}", HELP);
                Ok(())
            }
            Command::Listings(args) => self.listings(args).await,
            Command::Neighbours(args) => self.neighbours(args).await,
            Command::Show { kind, id, image } => self.show(kind, id, image).await,
            Command::Favorites { page, remove } => self.favorites(page, remove).await,
            Command::Favorite { action, kind, id } => self.favorite(action, kind, id).await,
            Command::IsFavorite { id } => self.is_favorite(id).await,
            Command::Publish(args) => self.publish(args).await,
            Command::Profile(args) => self.profile(args).await,
            Command::Articles { id, lang } => self.articles(id, &lang).await,
            Command::Contact {
                name,
                email,
                message,
            } => self.contact(&name, &email, &message).await,
            Command::Register {
                name,
                email,
                password,
            } => self.register(&name, &email, &password).await,
            Command::ForgotPassword { email } => self.forgot_password(&email).await,
            Command::ResetPassword {
                uid,
                token,
                password,
                confirm,
            } => self.reset_password(&uid, &token, &password, &confirm).await,
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Logout => self.logout().await,
            Command::Me => {
                match self.state.session.read().user() {
                    Some(user) => println!("{} <{}>", user.display_name(), user.email),
                    None => println!("Not logged in"),
                }
                Ok(())
            }
            Command::Config => {
                println!("# {}", AppConfig::config_path().display());
                print!("{}", toml::to_string_pretty(&*self.state.config.read())?);
                Ok(())
            }
        }
    }

    async fn listings(&self, args: ListArgs) -> Result<()> {
        let default_kind = self.state.config.read().listings.default_kind;
        let kind = args.kind.or(default_kind);
        if kind == Some(ListingKind::Neighbour) {
            bail!("use the 'neighbours' command for roommate profiles");
        }

        let mut list = ListPage::<PropertyFilters, Card>::new();
        if let Some(kind) = kind {
            list = list.with_kind(kind);
        }
        prepare(&mut list, &args)?;

        let ticket = list.begin_fetch();
        let result = self.api.listings(&ticket.query).await.map(cards);
        list.apply(&ticket, result);
        print_list(&list)
    }

    async fn neighbours(&self, args: ListArgs) -> Result<()> {
        let mut list = ListPage::<NeighbourFilters, Card>::new();
        prepare(&mut list, &args)?;

        let ticket = list.begin_fetch();
        let result = self.api.neighbours(&ticket.query).await.map(cards);
        list.apply(&ticket, result);
        print_list(&list)
    }

    async fn show(&self, kind: ListingKind, id: u64, image: Option<usize>) -> Result<()> {
        let outcome = DetailOutcome::from_load(kind, self.api.detail(kind, id).await);

        match outcome {
            DetailOutcome::Loaded(view) => {
                let delay = self.state.config.read().gallery.settle_delay();
                let mut gallery = Gallery::with_settle_delay(view.images.clone(), delay);
                if let Some(at) = image {
                    if !gallery.open_modal(at) {
                        bail!("image {} out of range ({} images)", at, gallery.len());
                    }
                }
                print_detail(&view, &gallery);
            }
            DetailOutcome::Redirect(path) => {
                eprintln!("Could not load {} #{}; back to {}", kind, id, path);
            }
        }
        Ok(())
    }

    async fn favorites(&self, page: u32, remove: Option<u64>) -> Result<()> {
        self.require_login()?;

        let mut list = ListPage::<Unfiltered, Card>::new();
        list.set_page(page);
        let ticket = list.begin_fetch();
        let result = self.api.favorites(list.page()).await.map(|f| Page {
            results: f.listings.iter().map(Card::from).collect(),
            total_pages: f.total_pages,
        });
        list.apply(&ticket, result);

        if let Some(id) = remove {
            let card = list
                .items()
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .with_context(|| format!("#{} is not on this page of favorites", id))?;

            let mut toggle = FavoriteToggle::new(card.favorite_target(), card.is_favorite)
                .with_context(CardContext::FavoritesList);
            match toggle.toggle(&self.api).await {
                ToggleEffect::Removed(target) => {
                    list.remove_item(target.id());
                    println!("Removed #{} from favorites", target.id());
                }
                ToggleEffect::None => eprintln!("Could not remove #{}; kept in favorites", id),
            }
        }

        print_list(&list)
    }

    async fn favorite(&self, action: FavoriteAction, kind: ListingKind, id: u64) -> Result<()> {
        self.require_login()?;

        // Start from the opposite state so the toggle issues the requested action
        let mut toggle = FavoriteToggle::new(
            FavoriteTarget::for_card(kind, id),
            action == FavoriteAction::Remove,
        );
        toggle.toggle(&self.api).await;

        if matches!(toggle.state(), Optimistic::RolledBack(_)) {
            bail!("favorite update for {} #{} failed", kind, id);
        }
        if toggle.is_favorite() {
            println!("{} #{} is in your favorites", kind, id);
        } else {
            println!("{} #{} removed from favorites", kind, id);
        }
        Ok(())
    }

    async fn is_favorite(&self, id: u64) -> Result<()> {
        self.require_login()?;
        if self.api.is_favorite(id).await? {
            println!("Listing #{} is in your favorites", id);
        } else {
            println!("Listing #{} is not in your favorites", id);
        }
        Ok(())
    }

    async fn publish(&self, args: PublishArgs) -> Result<()> {
        self.require_login()?;

        let draft = new_listing(&args);
        forms::ensure_valid(forms::validate_listing(&draft))?;

        let (accepted, rejected) = forms::partition_uploads(&args.images);
        for error in &rejected {
            eprintln!("Skipped: {}", error.user_message());
        }

        let created = self.api.create_listing(&draft).await?;
        tracing::info!("Listing {} created", created.id);

        let mut uploaded = Gallery::default();
        for file in &accepted {
            match self.api.upload_listing_image(created.id, file).await {
                Ok(image) => uploaded.push_images([image.url]),
                Err(e) => eprintln!("Upload of {} failed: {}", file.file_name(), e.user_message()),
            }
        }

        let kind = draft.kind.unwrap_or(ListingKind::Apartment);
        println!(
            "Published {} with {} image(s)",
            kind.detail_path(created.id),
            uploaded.len()
        );
        Ok(())
    }

    async fn profile(&self, args: ProfileArgs) -> Result<()> {
        self.require_login()?;

        let mut editor = ProfileEditor::new(self.api.profile().await?);
        if args.has_edits() {
            if let Some(path) = &args.avatar {
                let file = forms::check_upload(path)?;
                let url = self.api.upload_avatar(&file).await?;
                editor.set_photo(url);
            }

            let draft = editor.draft_mut();
            if let Some(name) = args.name {
                draft.name = name;
            }
            if let Some(city) = args.city {
                draft.city = Some(city);
            }
            if let Some(about) = args.about {
                draft.about = Some(about);
            }
            for code in &args.languages {
                editor.toggle_language(code);
            }

            if let Some(body) = editor.begin_save() {
                let result = self.api.save_profile(&body).await.map(|()| None);
                editor.complete_save(result)?;
                println!("Profile saved");
            }
        }

        print_profile(editor.saved());
        Ok(())
    }

    async fn articles(&self, id: Option<u64>, lang: &str) -> Result<()> {
        match id {
            Some(id) => print_article(&self.api.article(id).await?, lang),
            None => {
                let articles = self.api.articles().await?;
                if articles.is_empty() {
                    println!("No articles yet.");
                }
                for article in &articles {
                    println!("#{:<4} {} | {}", article.id, article.title, article.date);
                }
            }
        }
        Ok(())
    }

    async fn contact(&self, name: &str, email: &str, message: &str) -> Result<()> {
        forms::ensure_valid(forms::validate_contact(name, email, message))?;
        self.api.send_contact(name.trim(), email.trim(), message).await?;
        println!("Message sent");
        Ok(())
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        forms::ensure_valid(forms::validate_register(name, email, password))?;
        let user = self.api.register(name.trim(), email.trim(), password).await?;
        println!("Registered and logged in as {}", user.display_name());
        self.state.session.write().login(user);

        session_store::save_from(&self.cookie_path, &self.api)?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        forms::ensure_valid(forms::validate_reset_request(email))?;
        self.api.request_password_reset(email.trim()).await?;
        println!("If an account exists for {}, a reset link is on its way", email.trim());
        Ok(())
    }

    async fn reset_password(&self, uid: &str, token: &str, password: &str, confirm: &str) -> Result<()> {
        forms::ensure_valid(forms::validate_password_reset(password, confirm))?;
        self.api.confirm_password_reset(uid, token, password).await?;
        println!("Password updated; you can log in now");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<()> {
        let user = self.api.login(email, password).await?;
        println!("Logged in as {}", user.display_name());
        self.state.session.write().login(user);

        session_store::save_from(&self.cookie_path, &self.api)?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let mut session = self.state.session.read().clone();
        let result = session.logout(&self.api).await;
        *self.state.session.write() = session;

        session_store::clear(&self.cookie_path)?;
        result?;
        println!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flat_core::{Listing, PropertyField};

    #[test]
    fn test_parse_filters() {
        let criteria: PropertyFilters = parse_filters(&[
            "propertyType=APARTMENT".to_string(),
            "amenities=tv,balcony".to_string(),
        ])
        .unwrap();
        assert_eq!(criteria.property_type, "APARTMENT");
        assert_eq!(criteria.amenities, vec!["tv", "balcony"]);

        assert!(parse_filters::<PropertyFilters>(&["colour=red".to_string()]).is_err());
        assert!(parse_filters::<PropertyFilters>(&["rooms".to_string()]).is_err());
        assert!(parse_filters::<Unfiltered>(&["page=3".to_string()]).is_err());
    }

    #[test]
    fn test_prepare_builds_query() {
        let mut list = ListPage::<PropertyFilters, Card>::new();
        let args = ListArgs {
            kind: None,
            page: 2,
            search: "Praha".into(),
            filters: vec!["priceFrom=10000".into(), "propertyType=APARTMENT".into()],
        };
        prepare(&mut list, &args).unwrap();
        assert_eq!(
            list.query(),
            "page=2&search=Praha&propertyType=APARTMENT&priceFrom=10000"
        );
        assert!(list.filters().value(PropertyField::Rooms).is_empty());
    }

    #[test]
    fn test_publish_options_reach_listing_body() {
        let args = PublishArgs {
            kind: Some(ListingKind::Room),
            title: "Room in Karlín".into(),
            price: Some(9000.0),
            rental_period: Some(flat_core::RentalPeriod::Both),
            utilities: true,
            smoking_allowed: true,
            move_in_date: chrono::NaiveDate::from_ymd_opt(2027, 1, 15),
            images: vec!["a.png".into()],
            ..Default::default()
        };
        let body = serde_json::to_value(new_listing(&args)).unwrap();
        assert_eq!(body["rentalPeriod"], "BOTH");
        assert_eq!(body["utilities"], true);
        assert_eq!(body["smokingAllowed"], true);
        assert_eq!(body["petsAllowed"], false);
        assert_eq!(body["moveInDate"], "2027-01-15");
        assert!(body.get("images").is_none());

        let plain = PublishArgs {
            rental_period: None,
            ..args
        };
        let body = serde_json::to_value(new_listing(&plain)).unwrap();
        assert!(body.get("rentalPeriod").is_none());
    }

    #[test]
    fn test_cards_and_format() {
        let page: Page<Listing> = serde_json::from_str(
            r#"{"results": [{"id": 8, "type": "ROOM", "title": "Attic", "price": "9500", "address": "Brno"}], "total_pages": 4}"#,
        )
        .unwrap();
        let page = cards(page);
        assert_eq!(page.total_pages, 4);

        let line = format_card(&page.results[0]);
        assert!(line.contains("#8"));
        assert!(line.contains("ROOM"));
        assert!(line.contains("9500 Kč"));
        assert!(line.starts_with(' '));
    }
}
