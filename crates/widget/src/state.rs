//! Widget state machine.
//!
//! [`WidgetState::update`] is the whole transition table. It never performs
//! I/O: anything that has to leave the widget is returned as an [`Effect`]
//! for the runtime to execute, and results come back in as a [`Msg`].

use std::collections::HashSet;

use saved_cart_core::{CartLine, CustomerId, SaveCartRequest, SavedCart};

use crate::banner::{Banner, BannerStatus, BannerTitle};
use crate::reconcile::merge_selection;

/// Where the widget is in its save flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No signed-in buyer yet.
    #[default]
    Unresolved,
    /// Customer known, saved cart being fetched.
    Loading,
    /// Form shown, waiting for the buyer.
    Ready,
    /// Save succeeded; form hidden until the reset fires.
    Saved,
    /// Save failed; form hidden until the reset fires.
    Failed,
}

impl Phase {
    /// Whether the selection form is shown in this phase.
    #[must_use]
    pub const fn shows_form(self) -> bool {
        matches!(self, Self::Loading | Self::Ready)
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The buyer identity changed. Carries the opaque customer reference.
    BuyerIdentified(Option<String>),
    /// The checkout token became known or changed.
    CheckoutTokenChanged(Option<String>),
    /// The live checkout cart changed.
    LiveLinesChanged(Vec<CartLine>),
    /// The buyer changed the live-cart checklist.
    SelectLive(Vec<String>),
    /// The buyer changed the saved-cart checklist.
    SelectSaved(Vec<String>),
    /// A fetch finished. `None` means no cart was returned.
    SavedCartFetched(Option<SavedCart>),
    /// A fetch failed.
    SavedCartUnavailable,
    /// The buyer pressed Save.
    SaveRequested,
    /// The service stored the selection.
    SaveSucceeded,
    /// The save was rejected, or no request could be made.
    SaveFailed,
    /// The banner reset delay elapsed.
    ResetElapsed,
}

/// Work the runtime performs on behalf of the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load the cart saved for this customer.
    FetchSavedCart(CustomerId),
    /// Store this selection.
    SaveCart(SaveCartRequest),
    /// Start (or restart) the banner reset delay.
    ScheduleReset,
    /// Drop any pending banner reset.
    CancelReset,
}

/// Widget-local state.
#[derive(Debug, Clone, Default)]
pub struct WidgetState {
    phase: Phase,
    customer_id: Option<CustomerId>,
    checkout_token: Option<String>,
    live_lines: Vec<CartLine>,
    saved_lines: Vec<CartLine>,
    selected_live: HashSet<String>,
    selected_saved: HashSet<String>,
    saving: bool,
}

impl WidgetState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    /// Lines from the last successful fetch.
    #[must_use]
    pub fn saved_lines(&self) -> &[CartLine] {
        &self.saved_lines
    }

    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether either checklist has anything ticked.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected_live.is_empty() || !self.selected_saved.is_empty()
    }

    /// Apply a message and return the effects it triggers.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::BuyerIdentified(reference) => self.identify(reference.as_deref()),
            Msg::CheckoutTokenChanged(token) => {
                self.checkout_token = token;
                Vec::new()
            }
            Msg::LiveLinesChanged(lines) => {
                self.live_lines = lines;
                Vec::new()
            }
            Msg::SelectLive(ids) => {
                self.selected_live = ids.into_iter().collect();
                Vec::new()
            }
            Msg::SelectSaved(ids) => {
                self.selected_saved = ids.into_iter().collect();
                Vec::new()
            }
            Msg::SavedCartFetched(cart) => {
                if let Some(cart) = cart {
                    self.saved_lines = cart.products;
                }
                self.finish_loading();
                Vec::new()
            }
            Msg::SavedCartUnavailable => {
                self.finish_loading();
                Vec::new()
            }
            Msg::SaveRequested => self.request_save(),
            Msg::SaveSucceeded => {
                self.saving = false;
                self.phase = Phase::Saved;
                vec![Effect::ScheduleReset]
            }
            Msg::SaveFailed => {
                self.saving = false;
                self.phase = Phase::Failed;
                vec![Effect::ScheduleReset]
            }
            Msg::ResetElapsed => {
                if matches!(self.phase, Phase::Saved | Phase::Failed) {
                    self.phase = Phase::Ready;
                }
                Vec::new()
            }
        }
    }

    fn identify(&mut self, reference: Option<&str>) -> Vec<Effect> {
        let Some(customer_id) = reference.and_then(CustomerId::from_buyer_reference) else {
            return Vec::new();
        };

        if self.customer_id.as_ref() == Some(&customer_id) {
            return Vec::new();
        }

        // Another customer's snapshot must not be offered for re-saving.
        if self.customer_id.is_some() {
            self.saved_lines.clear();
            self.selected_saved.clear();
        }

        self.customer_id = Some(customer_id.clone());
        self.phase = Phase::Loading;
        vec![Effect::CancelReset, Effect::FetchSavedCart(customer_id)]
    }

    fn finish_loading(&mut self) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Ready;
        }
    }

    fn request_save(&mut self) -> Vec<Effect> {
        let Some(customer_id) = &self.customer_id else {
            return Vec::new();
        };
        // The saved checklist is incomplete until the fetch settles.
        if self.phase != Phase::Ready || self.saving || !self.has_selection() {
            return Vec::new();
        }

        let products = merge_selection(
            &self.live_lines,
            &self.selected_live,
            &self.saved_lines,
            &self.selected_saved,
        );

        let request = SaveCartRequest {
            checkout_token: self.checkout_token.clone(),
            selected_product: Some(products),
            customer_id: Some(customer_id.as_str().to_owned()),
        };

        self.saving = true;
        vec![Effect::SaveCart(request)]
    }

    /// Render model for the current state.
    #[must_use]
    pub fn view(&self) -> WidgetView {
        let banner = match self.phase {
            Phase::Unresolved => Banner::new(BannerTitle::NotLoggedIn, BannerStatus::Critical),
            Phase::Loading | Phase::Ready => Banner::new(BannerTitle::SaveCart, BannerStatus::Info),
            Phase::Saved => Banner::new(BannerTitle::Saved, BannerStatus::Success),
            Phase::Failed => Banner::new(BannerTitle::Failed, BannerStatus::Critical),
        };

        let form = self.phase.shows_form().then(|| FormView {
            live_lines: checklist(&self.live_lines, &self.selected_live),
            saved_lines: (!self.saved_lines.is_empty())
                .then(|| checklist(&self.saved_lines, &self.selected_saved)),
            save_button: SaveButton {
                disabled: !self.has_selection(),
                loading: self.saving || self.phase == Phase::Loading,
            },
        });

        WidgetView { banner, form }
    }
}

fn checklist(lines: &[CartLine], selected: &HashSet<String>) -> Vec<ChecklistItem> {
    lines
        .iter()
        .map(|line| ChecklistItem {
            id: line.id.clone(),
            label: line.title().to_owned(),
            selected: selected.contains(&line.id),
        })
        .collect()
}

/// What the widget displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub banner: Banner,
    /// Present only while the buyer can make a selection.
    pub form: Option<FormView>,
}

/// The two checklists and the Save button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub live_lines: Vec<ChecklistItem>,
    /// Omitted when nothing has been saved.
    pub saved_lines: Option<Vec<ChecklistItem>>,
    pub save_button: SaveButton,
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveButton {
    pub disabled: bool,
    pub loading: bool,
}
