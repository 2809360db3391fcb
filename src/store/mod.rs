//! Client-side cart store.
//!
//! A storefront front-end keeps one in-memory source of truth for the
//! current user and cart, mirrored to durable local storage. This module
//! is that store: an explicit typed state container whose only mutation
//! path is a pure reducer over a tagged [`Action`], plus the persistence
//! seam ([`persist::StateStore`]) and the pure catalog filter/sort helpers
//! a product-listing view uses.
//!
//! Totals are always derived — [`StoreState::total`] and
//! [`StoreState::count`] recompute from the surviving entries, so they are
//! exact for any cart content including empty.

pub mod catalog;
pub mod persist;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use persist::{PersistedState, StateStore};

/// Identity of a cart entry, tagged with its origin.
///
/// Guest sessions create `Local` entries that exist only in this store;
/// `Server` entries mirror rows persisted by the cart API. Keeping the
/// origin in the type replaces the fragile id-prefix convention a naive
/// client would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "origin", content = "id", rename_all = "lowercase")]
pub enum EntryId {
    Local(Uuid),
    Server(Uuid),
}

impl EntryId {
    pub fn is_local(&self) -> bool {
        matches!(self, EntryId::Local(_))
    }
}

/// The product fields a cart entry carries around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
}

/// One cart line held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: EntryId,
    pub product: ProductSnapshot,
    pub quantity: u32,
}

/// The signed-in user, as persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_admin: bool,
}

/// Store state. `total` and `count` are methods, not fields: they derive
/// from `items` on demand and can never drift.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreState {
    pub user: Option<StoredUser>,
    pub items: Vec<CartEntry>,
    pub loading: bool,
}

impl StoreState {
    /// Sum of price × quantity over all entries.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|entry| entry.product.price * Decimal::from(entry.quantity))
            .sum()
    }

    /// Sum of quantities over all entries.
    pub fn count(&self) -> u64 {
        self.items.iter().map(|entry| u64::from(entry.quantity)).sum()
    }
}

/// Tagged store actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUser(Option<StoredUser>),
    /// Replace the cart wholesale (e.g. a server cart load).
    SetCart(Vec<CartEntry>),
    /// Add an entry; an existing entry for the same product absorbs the
    /// quantity instead of producing a duplicate.
    AddItem(CartEntry),
    /// Replace the quantity of the entry with this id. Unknown ids leave
    /// the state unchanged.
    UpdateQuantity { id: EntryId, quantity: u32 },
    /// Remove the entry with this id. Unknown ids leave the state
    /// unchanged.
    RemoveItem(EntryId),
    ClearCart,
    SetLoading(bool),
}

/// The reducer: a pure function from state and action to the next state.
pub fn reduce(state: StoreState, action: Action) -> StoreState {
    let StoreState {
        user,
        mut items,
        loading,
    } = state;

    match action {
        Action::SetUser(next) => StoreState {
            user: next,
            items,
            loading,
        },
        Action::SetCart(next) => StoreState {
            user,
            items: next,
            loading,
        },
        Action::AddItem(entry) => {
            match items
                .iter_mut()
                .find(|existing| existing.product.id == entry.product.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(entry.quantity);
                }
                None => items.push(entry),
            }
            StoreState {
                user,
                items,
                loading,
            }
        }
        Action::UpdateQuantity { id, quantity } => {
            if let Some(entry) = items.iter_mut().find(|entry| entry.id == id) {
                entry.quantity = quantity;
            }
            StoreState {
                user,
                items,
                loading,
            }
        }
        Action::RemoveItem(id) => {
            items.retain(|entry| entry.id != id);
            StoreState {
                user,
                items,
                loading,
            }
        }
        Action::ClearCart => StoreState {
            user,
            items: Vec::new(),
            loading,
        },
        Action::SetLoading(next) => StoreState {
            user,
            items,
            loading: next,
        },
    }
}

/// Folds a guest cart into a freshly loaded server cart.
///
/// Server entries win identity. A guest entry for a product the server
/// already has contributes its quantity to the server entry; guest-only
/// products are appended with their local ids intact, so a sync layer can
/// tell which entries still need uploading.
pub fn merge_carts(local: &[CartEntry], server: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut merged = server;
    for entry in local {
        match merged
            .iter_mut()
            .find(|existing| existing.product.id == entry.product.id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(entry.quantity);
            }
            None => merged.push(entry.clone()),
        }
    }
    merged
}

/// The state container: owns the current [`StoreState`], applies actions
/// through [`reduce`], and mirrors every change to its [`StateStore`].
pub struct CartStore<S: StateStore> {
    state: StoreState,
    storage: S,
}

impl<S: StateStore> CartStore<S> {
    /// Opens the store, loading any previously persisted user and cart.
    /// An unreadable snapshot falls back to an empty state.
    pub fn open(storage: S) -> Self {
        let state = match storage.load() {
            Ok(Some(persisted)) => StoreState {
                user: persisted.user,
                items: persisted.cart,
                loading: false,
            },
            Ok(None) => StoreState::default(),
            Err(err) => {
                warn!("Discarding unreadable store snapshot: {}", err);
                StoreState::default()
            }
        };
        Self { state, storage }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Applies an action and persists the result. Persistence failures are
    /// logged; the in-memory state is already advanced and stays
    /// authoritative.
    pub fn dispatch(&mut self, action: Action) -> &StoreState {
        self.state = reduce(std::mem::take(&mut self.state), action);
        let snapshot = PersistedState {
            user: self.state.user.clone(),
            cart: self.state.items.clone(),
        };
        if let Err(err) = self.storage.save(&snapshot) {
            warn!("Failed to persist store state: {}", err);
        }
        &self.state
    }

    /// Installs a server-loaded cart. When a signed-in user still has
    /// guest entries, the two carts are merged instead of letting the
    /// server load silently win.
    pub fn load_server_cart(&mut self, server: Vec<CartEntry>) -> &StoreState {
        let has_guest_items = self.state.items.iter().any(|entry| entry.id.is_local());
        let next = if self.state.user.is_some() && has_guest_items {
            merge_carts(&self.state.items, server)
        } else {
            server
        };
        self.dispatch(Action::SetCart(next))
    }
}
