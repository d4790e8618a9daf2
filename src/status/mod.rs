//! Device Status
//!
//! The status snapshot fetched from the remote API, its rendered panel form,
//! and the dashboard's alert feed.

mod alerts;
mod panel;
mod snapshot;

pub use alerts::{Alert, AlertFeed, NO_ALERTS};
pub use panel::{render, Change, DeviceView, Element, Panel};
pub use snapshot::{value_text, DeviceStatusSnapshot};
