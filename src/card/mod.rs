//! # Person cards
//!
//! A [`PersonCard`] is a pure view of one person at one position. It owns no
//! position state and never mutates anything; pointer input on a card is
//! turned into a [`CardIntent`] for the canvas to act on.
//!
//! Cards are rebuilt on every animation frame of a drag, so [`CardRenderer`]
//! memoizes them: a card is rebuilt only when its identity, position,
//! selection or dragging flag changed.

use std::fmt::Write;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{Gender, Person, PersonId, Point, Rect, Size};

// ============================================================================
// View
// ============================================================================

/// Image shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avatar {
    Url(String),
    /// No uploaded image; a default picked from the person's gender.
    Placeholder(Gender),
}

impl Avatar {
    pub fn for_person(person: &Person) -> Self {
        match &person.avatar_url {
            Some(url) => Avatar::Url(url.clone()),
            None => Avatar::Placeholder(person.gender),
        }
    }

    pub fn href(&self) -> &str {
        match self {
            Avatar::Url(url) => url,
            Avatar::Placeholder(Gender::Male) => "/avatars/placeholder-male.svg",
            Avatar::Placeholder(Gender::Female) => "/avatars/placeholder-female.svg",
            Avatar::Placeholder(Gender::Unspecified) => "/avatars/placeholder.svg",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Avatar::Placeholder(_))
    }
}

/// Something the user asked for by interacting with a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CardIntent {
    /// Pointer went down on the card; `pointer` is in screen space.
    DragStart { person_id: PersonId, pointer: Point },
    /// Single click.
    Select(PersonId),
    /// Double click.
    View(PersonId),
    /// Edit button.
    Edit(PersonId),
}

impl CardIntent {
    pub fn person_id(&self) -> &PersonId {
        match self {
            CardIntent::DragStart { person_id, .. } => person_id,
            CardIntent::Select(id) | CardIntent::View(id) | CardIntent::Edit(id) => id,
        }
    }
}

/// Rendered card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonCard {
    pub id: PersonId,
    pub display_name: String,
    pub life_span: String,
    pub avatar: Avatar,
    pub center: Point,
    pub size: Size,
    pub selected: bool,
    pub dragging: bool,
}

impl PersonCard {
    pub fn new(person: &Person, center: Point, size: Size, selected: bool, dragging: bool) -> Self {
        Self {
            id: person.id.clone(),
            display_name: person.display_name.clone(),
            life_span: person.life_span(),
            avatar: Avatar::for_person(person),
            center,
            size,
            selected,
            dragging,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.size)
    }

    pub fn pointer_down(&self, pointer: Point) -> CardIntent {
        CardIntent::DragStart { person_id: self.id.clone(), pointer }
    }

    pub fn click(&self) -> CardIntent {
        CardIntent::Select(self.id.clone())
    }

    pub fn double_click(&self) -> CardIntent {
        CardIntent::View(self.id.clone())
    }

    pub fn edit(&self) -> CardIntent {
        CardIntent::Edit(self.id.clone())
    }

    /// SVG `<g>` fragment, centered on the card position.
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.size.width, self.size.height);
        let avatar = (w * 0.45).min(h * 0.45);
        let mut class = String::from("person-card");
        if self.selected {
            class.push_str(" selected");
        }
        if self.dragging {
            class.push_str(" dragging");
        }

        let mut out = String::new();
        let _ = write!(
            out,
            r#"<g class="{class}" data-person-id="{id}" transform="translate({x} {y})">"#,
            id = escape_xml(self.id.as_str()),
            x = self.center.x,
            y = self.center.y,
        );
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="{w}" height="{h}" rx="8"/>"#,
            -w / 2.0,
            -h / 2.0,
        );
        let _ = write!(
            out,
            r#"<image class="{}" href="{}" x="{}" y="{}" width="{avatar}" height="{avatar}"/>"#,
            if self.avatar.is_placeholder() { "avatar placeholder" } else { "avatar" },
            escape_xml(self.avatar.href()),
            -avatar / 2.0,
            -h / 2.0 + 12.0,
        );
        let _ = write!(
            out,
            r#"<text class="name" text-anchor="middle" y="{}">{}</text>"#,
            h / 2.0 - 44.0,
            escape_xml(&self.display_name),
        );
        let _ = write!(
            out,
            r#"<text class="life-span" text-anchor="middle" y="{}">{}</text>"#,
            h / 2.0 - 20.0,
            escape_xml(&self.life_span),
        );
        out.push_str("</g>");
        out
    }
}

/// Escape text for use in SVG attributes and text nodes.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

// ============================================================================
// Memoization
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CardKey {
    x: u64,
    y: u64,
    selected: bool,
    dragging: bool,
}

impl CardKey {
    fn new(center: Point, selected: bool, dragging: bool) -> Self {
        Self { x: center.x.to_bits(), y: center.y.to_bits(), selected, dragging }
    }
}

/// Memo cache of rendered cards, one slot per person.
#[derive(Debug)]
pub struct CardRenderer {
    size: Size,
    cache: HashMap<PersonId, (CardKey, Arc<PersonCard>)>,
    renders: u64,
}

impl CardRenderer {
    pub fn new(size: Size) -> Self {
        Self { size, cache: HashMap::new(), renders: 0 }
    }

    /// The card for `person`, rebuilt only if its key changed since the
    /// last call. Unchanged cards come back as the same `Arc`.
    pub fn render(&mut self, person: &Person, center: Point, selected: bool, dragging: bool) -> Arc<PersonCard> {
        let key = CardKey::new(center, selected, dragging);
        if let Some((cached, card)) = self.cache.get(&person.id) {
            if *cached == key {
                return Arc::clone(card);
            }
        }
        self.renders += 1;
        let card = Arc::new(PersonCard::new(person, center, self.size, selected, dragging));
        self.cache.insert(person.id.clone(), (key, Arc::clone(&card)));
        card
    }

    /// Number of cards built so far (cache misses).
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Drop cached cards for people that are gone.
    pub fn retain(&mut self, keep: impl Fn(&PersonId) -> bool) {
        self.cache.retain(|id, _| keep(id));
    }

    /// Forget everything, e.g. after person data changed.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
