//! Command-line parsing

use anyhow::{bail, Result};
use pico_args::Arguments;
use std::ffi::OsString;
use std::path::PathBuf;

use chrono::NaiveDate;
use flat_core::{FavoriteAction, ListingKind, RentalPeriod};

pub const HELP: &str = "\
flatfly: FlatFly marketplace client

USAGE:
  flatfly <COMMAND> [OPTIONS]

COMMANDS:
  listings [--kind K] [--page N] [--search S] [--filter F=V]...
  neighbours [--page N] [--search S] [--filter F=V]...
  show <KIND> <ID> [--image N]
  favorites [--page N] [--remove ID]
  fav <add|remove> <KIND> <ID>
  is-favorite <ID>
  publish --type K --title T --description D --price P [--region R]
          [--address A] [--size N] [--rooms N] [--beds N] [--amenity X]...
          [--rental-period short|long|both] [--move-in YYYY-MM-DD]
          [--roommates] [--internet] [--utilities] [--pets] [--smoking]
          [--image PATH]...
  profile [--name N] [--city C] [--about A] [--language CODE]... [--avatar PATH]
  articles [ID] [--lang en|ru|cz]
  contact --name N --email E --message M
  register <EMAIL> --name N --password P
  forgot-password <EMAIL>
  reset-password <UID> <TOKEN> --password P --confirm P
  login <EMAIL> --password P
  logout
  me
  config

Multi-select filters take a comma list: --filter amenities=tv,balcony
";

/// Search options shared by the list commands
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListArgs {
    pub kind: Option<ListingKind>,
    pub page: u32,
    pub search: String,
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishArgs {
    pub kind: Option<ListingKind>,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub region: String,
    pub address: String,
    pub size: Option<u32>,
    pub rooms: Option<u32>,
    pub beds: Option<u32>,
    pub amenities: Vec<String>,
    pub has_roommates: bool,
    pub rental_period: Option<RentalPeriod>,
    pub internet: bool,
    pub utilities: bool,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub move_in_date: Option<NaiveDate>,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileArgs {
    pub name: Option<String>,
    pub city: Option<String>,
    pub about: Option<String>,
    pub languages: Vec<String>,
    pub avatar: Option<PathBuf>,
}

impl ProfileArgs {
    pub fn has_edits(&self) -> bool {
        self.name.is_some()
            || self.city.is_some()
            || self.about.is_some()
            || !self.languages.is_empty()
            || self.avatar.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Listings(ListArgs),
    Neighbours(ListArgs),
    Show {
        kind: ListingKind,
        id: u64,
        image: Option<usize>,
    },
    Favorites {
        page: u32,
        remove: Option<u64>,
    },
    Favorite {
        action: FavoriteAction,
        kind: ListingKind,
        id: u64,
    },
    IsFavorite {
        id: u64,
    },
    Publish(PublishArgs),
    Profile(ProfileArgs),
    Articles {
        id: Option<u64>,
        lang: String,
    },
    Contact {
        name: String,
        email: String,
        message: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        uid: String,
        token: String,
        password: String,
        confirm: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Me,
    Config,
}

fn list_args(args: &mut Arguments) -> Result<ListArgs> {
    Ok(ListArgs {
        kind: args.opt_value_from_str("--kind")?,
        page: args.opt_value_from_str("--page")?.unwrap_or(1),
        search: args.opt_value_from_str("--search")?.unwrap_or_default(),
        filters: args.values_from_str("--filter")?,
    })
}

fn favorite_action(name: &str) -> Result<FavoriteAction> {
    match name {
        "add" => Ok(FavoriteAction::Add),
        "remove" | "rm" => Ok(FavoriteAction::Remove),
        other => bail!("expected 'add' or 'remove', got '{}'", other),
    }
}

/// Parse a full argument list (without the program name)
pub fn parse_from(args: Vec<OsString>) -> Result<Command> {
    let mut args = Arguments::from_vec(args);

    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }

    let command = match args.subcommand()?.as_deref() {
        None | Some("help") => Command::Help,
        Some("listings") => Command::Listings(list_args(&mut args)?),
        Some("neighbours") => {
            let mut list = list_args(&mut args)?;
            list.kind = Some(ListingKind::Neighbour);
            Command::Neighbours(list)
        }
        Some("show") => {
            let image = args.opt_value_from_str("--image")?;
            Command::Show {
                kind: args.free_from_str()?,
                id: args.free_from_str()?,
                image,
            }
        }
        Some("favorites") => Command::Favorites {
            page: args.opt_value_from_str("--page")?.unwrap_or(1),
            remove: args.opt_value_from_str("--remove")?,
        },
        Some("fav") => {
            let action: String = args.free_from_str()?;
            Command::Favorite {
                action: favorite_action(&action)?,
                kind: args.free_from_str()?,
                id: args.free_from_str()?,
            }
        }
        Some("publish") => Command::Publish(PublishArgs {
            kind: args.opt_value_from_str("--type")?,
            title: args.opt_value_from_str("--title")?.unwrap_or_default(),
            description: args.opt_value_from_str("--description")?.unwrap_or_default(),
            price: args.opt_value_from_str("--price")?,
            region: args.opt_value_from_str("--region")?.unwrap_or_default(),
            address: args.opt_value_from_str("--address")?.unwrap_or_default(),
            size: args.opt_value_from_str("--size")?,
            rooms: args.opt_value_from_str("--rooms")?,
            beds: args.opt_value_from_str("--beds")?,
            amenities: args.values_from_str("--amenity")?,
            has_roommates: args.contains("--roommates"),
            rental_period: args.opt_value_from_str("--rental-period")?,
            internet: args.contains("--internet"),
            utilities: args.contains("--utilities"),
            pets_allowed: args.contains("--pets"),
            smoking_allowed: args.contains("--smoking"),
            move_in_date: args.opt_value_from_str("--move-in")?,
            images: args.values_from_str("--image")?,
        }),
        Some("is-favorite") => Command::IsFavorite {
            id: args.free_from_str()?,
        },
        Some("profile") => Command::Profile(ProfileArgs {
            name: args.opt_value_from_str("--name")?,
            city: args.opt_value_from_str("--city")?,
            about: args.opt_value_from_str("--about")?,
            languages: args.values_from_str("--language")?,
            avatar: args.opt_value_from_str("--avatar")?,
        }),
        Some("articles") => {
            let lang = args.opt_value_from_str("--lang")?.unwrap_or_else(|| "en".to_string());
            Command::Articles {
                id: args.opt_free_from_str()?,
                lang,
            }
        }
        Some("contact") => Command::Contact {
            name: args.opt_value_from_str("--name")?.unwrap_or_default(),
            email: args.opt_value_from_str("--email")?.unwrap_or_default(),
            message: args.opt_value_from_str("--message")?.unwrap_or_default(),
        },
        Some("register") => {
            let name = args.opt_value_from_str("--name")?.unwrap_or_default();
            let password = args.value_from_str("--password")?;
            Command::Register {
                name,
                email: args.free_from_str()?,
                password,
            }
        }
        Some("forgot-password") => Command::ForgotPassword {
            email: args.free_from_str()?,
        },
        Some("reset-password") => {
            let password = args.opt_value_from_str("--password")?.unwrap_or_default();
            let confirm = args.opt_value_from_str("--confirm")?.unwrap_or_default();
            Command::ResetPassword {
                uid: args.free_from_str()?,
                token: args.free_from_str()?,
                password,
                confirm,
            }
        }
        Some("login") => {
            let password = args.value_from_str("--password")?;
            Command::Login {
                email: args.free_from_str()?,
                password,
            }
        }
        Some("logout") => Command::Logout,
        Some("me") => Command::Me,
        Some("config") => Command::Config,
        Some(other) => bail!("unknown command '{}'; try --help", other),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {:?}", rest);
    }
    Ok(command)
}

pub fn parse_env() -> Result<Command> {
    parse_from(std::env::args_os().skip(1).collect())
}
