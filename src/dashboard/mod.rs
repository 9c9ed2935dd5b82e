//! Client-side view state for the dashboard pages.
//!
//! Each page is a reducer ([`accounts::update`], [`payouts::update`]) over
//! its own state. Reducers never perform I/O; they return actions, and a
//! [`PageRunner`] turns those into proxy calls through a [`DashboardApi`].

pub mod accounts;
pub mod api;
pub mod draft;
pub mod guard;
pub mod payouts;
pub mod runner;

pub use accounts::{AccountsAction, AccountsMessage, AccountsPage};
pub use api::{DashboardApi, HttpDashboardApi};
pub use draft::{DraftEdit, DraftError, DraftPayouts, KnownRecipient};
pub use guard::{FetchGuard, Ticket};
pub use payouts::{PayoutsAction, PayoutsMessage, PayoutsPage, PayoutsTab, StatusFilter};
pub use runner::{Page, PageRunner};
