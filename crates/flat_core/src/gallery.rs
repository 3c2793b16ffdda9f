//! Image gallery navigation with a transition lock and a lightbox modal
//!
//! One gallery type serves listing detail, publish previews and profile photos.

use std::time::{Duration, Instant};

/// Length of the slide animation; navigation is locked for this long
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(700);

/// Transition phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GalleryPhase {
    #[default]
    Idle,
    Transitioning { started: Instant },
}

/// Keys the lightbox reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    Left,
    Right,
    Other,
}

impl GalleryKey {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => GalleryKey::Escape,
            "ArrowLeft" | "Left" => GalleryKey::Left,
            "ArrowRight" | "Right" => GalleryKey::Right,
            _ => GalleryKey::Other,
        }
    }
}

/// Gallery state
#[derive(Clone, Debug)]
pub struct Gallery {
    images: Vec<String>,
    index: usize,
    phase: GalleryPhase,
    modal_open: bool,
    settle_delay: Duration,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Gallery {
    pub fn new(images: Vec<String>) -> Self {
        Self::with_settle_delay(images, DEFAULT_SETTLE_DELAY)
    }

    pub fn with_settle_delay(images: Vec<String>, settle_delay: Duration) -> Self {
        Self {
            images,
            index: 0,
            phase: GalleryPhase::Idle,
            modal_open: false,
            settle_delay,
        }
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    /// Current image, or the placeholder for an empty gallery
    pub fn current_or_default(&self) -> String {
        crate::image_or_default(self.current())
    }

    /// "2 / 5" style indicator, shown only when there is something to page through
    pub fn position_label(&self) -> Option<String> {
        (self.len() > 1).then(|| format!("{} / {}", self.index + 1, self.len()))
    }

    pub fn phase(&self) -> GalleryPhase {
        self.phase
    }

    /// Is an animation still in flight?
    pub fn is_transitioning(&self) -> bool {
        match self.phase {
            GalleryPhase::Idle => false,
            GalleryPhase::Transitioning { started } => started.elapsed() < self.settle_delay,
        }
    }

    /// Return to Idle once the settle delay has passed. Returns true if it did.
    pub fn tick(&mut self) -> bool {
        if matches!(self.phase, GalleryPhase::Transitioning { .. }) && !self.is_transitioning() {
            self.phase = GalleryPhase::Idle;
            return true;
        }
        false
    }

    /// Animation-completion signal; unlocks immediately
    pub fn finish_transition(&mut self) {
        self.phase = GalleryPhase::Idle;
    }

    fn can_navigate(&mut self) -> bool {
        self.tick();
        self.phase == GalleryPhase::Idle
    }

    fn start_transition(&mut self, target: usize) {
        self.index = target;
        self.phase = GalleryPhase::Transitioning {
            started: Instant::now(),
        };
    }

    /// Move to the next image with wraparound
    pub fn next(&mut self) -> bool {
        if self.len() <= 1 || !self.can_navigate() {
            return false;
        }
        let target = (self.index + 1) % self.len();
        self.start_transition(target);
        true
    }

    /// Move to the previous image with wraparound
    pub fn previous(&mut self) -> bool {
        if self.len() <= 1 || !self.can_navigate() {
            return false;
        }
        let target = (self.index + self.len() - 1) % self.len();
        self.start_transition(target);
        true
    }

    /// Jump to a thumbnail
    pub fn go_to(&mut self, target: usize) -> bool {
        if target >= self.len() || target == self.index || !self.can_navigate() {
            return false;
        }
        self.start_transition(target);
        true
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// The host suspends page scrolling while the lightbox is up
    pub fn scroll_locked(&self) -> bool {
        self.modal_open
    }

    /// Open the lightbox at `at`
    pub fn open_modal(&mut self, at: usize) -> bool {
        if at >= self.len() {
            return false;
        }
        self.index = at;
        self.modal_open = true;
        true
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    /// Keyboard input while the lightbox is open. Returns true if handled.
    pub fn handle_key(&mut self, key: GalleryKey) -> bool {
        if !self.modal_open {
            return false;
        }
        match key {
            GalleryKey::Escape => {
                self.close_modal();
                true
            }
            GalleryKey::Left => self.previous(),
            GalleryKey::Right => self.next(),
            GalleryKey::Other => false,
        }
    }

    /// Replace the image set (new data arrived)
    pub fn set_images(&mut self, images: Vec<String>) {
        self.images = images;
        self.index = 0;
        self.phase = GalleryPhase::Idle;
        if self.images.is_empty() {
            self.modal_open = false;
        }
    }

    /// Append local upload previews; the current position is kept
    pub fn push_images(&mut self, images: impl IntoIterator<Item = String>) {
        self.images.extend(images);
    }

    /// Drop one image, keeping the index on a valid neighbour
    pub fn remove_image(&mut self, at: usize) -> Option<String> {
        if at >= self.len() {
            return None;
        }
        let removed = self.images.remove(at);

        if at < self.index || self.index >= self.len() {
            self.index = self.index.saturating_sub(1);
        }
        self.phase = GalleryPhase::Idle;
        if self.images.is_empty() {
            self.index = 0;
            self.modal_open = false;
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("/media/{}.jpg", i)).collect()
    }

    #[test]
    fn test_next_wraps_back_to_start() {
        let mut g = Gallery::new(images(4));
        g.go_to(2);
        g.finish_transition();

        for _ in 0..4 {
            assert!(g.next());
            g.finish_transition();
        }
        assert_eq!(g.index(), 2);
    }

    #[test]
    fn test_navigation_locked_while_transitioning() {
        let mut g = Gallery::new(images(3));
        assert!(g.next());
        assert_eq!(g.index(), 1);
        assert!(g.is_transitioning());

        // Dropped, not queued
        assert!(!g.next());
        assert!(!g.previous());
        assert!(!g.go_to(0));
        assert_eq!(g.index(), 1);

        g.finish_transition();
        assert!(g.next());
        assert_eq!(g.index(), 2);
    }

    #[test]
    fn test_lock_releases_after_settle_delay() {
        let mut g = Gallery::with_settle_delay(images(3), Duration::from_millis(5));
        assert!(g.next());
        assert!(!g.next());

        std::thread::sleep(Duration::from_millis(20));
        assert!(!g.is_transitioning());
        assert!(g.next());
        assert_eq!(g.index(), 2);
    }

    #[test]
    fn test_single_and_empty_galleries_do_not_move() {
        let mut one = Gallery::new(images(1));
        assert!(!one.next());
        assert!(!one.previous());
        assert_eq!(one.index(), 0);
        assert_eq!(one.position_label(), None);

        let mut empty = Gallery::default();
        assert!(!empty.next());
        assert!(!empty.open_modal(0));
        assert_eq!(empty.current(), None);
        assert_eq!(empty.current_or_default(), crate::DEFAULT_IMAGE_URL);
    }

    #[test]
    fn test_modal_previous_wraps() {
        let mut g = Gallery::new(images(3));
        assert!(g.open_modal(1));
        assert!(g.scroll_locked());

        assert!(g.previous());
        assert_eq!(g.index(), 0);
        g.finish_transition();

        assert!(g.previous());
        assert_eq!(g.index(), 2);
        assert_eq!(g.position_label().as_deref(), Some("3 / 3"));
    }

    #[test]
    fn test_escape_closes_modal() {
        let mut g = Gallery::new(images(2));
        assert!(!g.handle_key(GalleryKey::Escape));

        g.open_modal(0);
        assert!(g.handle_key(GalleryKey::Right));
        assert_eq!(g.index(), 1);
        assert!(g.handle_key(GalleryKey::from_name("Escape")));
        assert!(!g.is_modal_open());
        assert!(!g.scroll_locked());
    }

    #[test]
    fn test_go_to_same_index_is_rejected() {
        let mut g = Gallery::new(images(3));
        assert!(!g.go_to(0));
        assert!(!g.go_to(7));
        assert!(g.go_to(2));
        assert_eq!(g.current(), Some("/media/2.jpg"));
    }

    #[test]
    fn test_set_images_resets_mid_transition() {
        let mut g = Gallery::new(images(3));
        g.next();
        assert!(g.is_transitioning());

        g.set_images(images(5));
        assert_eq!(g.index(), 0);
        assert_eq!(g.phase(), GalleryPhase::Idle);
        assert!(g.next());
    }

    #[test]
    fn test_upload_previews() {
        let mut g = Gallery::default();
        g.push_images(images(3));
        g.go_to(2);
        g.finish_transition();

        assert_eq!(g.remove_image(0).as_deref(), Some("/media/0.jpg"));
        assert_eq!(g.index(), 1);
        assert_eq!(g.current(), Some("/media/2.jpg"));

        g.remove_image(1);
        assert_eq!(g.index(), 0);
        g.remove_image(0);
        assert!(g.is_empty());
        assert_eq!(g.index(), 0);
        assert_eq!(g.remove_image(0), None);
    }
}
