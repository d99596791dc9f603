//! State and operations behind the rider request screen.
//!
//! The screen keeps a local mirror of the pending requests it fetched on
//! mount. The mirror is overwritten wholesale by a fetch and patched one field
//! at a time, and only after the store confirms the write. Store I/O and state
//! changes are separate steps so a UI can await the store without holding a
//! borrow of its state.

use dioxus_logger::tracing;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::car_selection::CarSelectionRequest;
use crate::car_selection::RequestStatus;
use crate::map::MapView;
use crate::prefs::map_preference::MissingCoordinatePolicy;
use crate::store::RequestStore;
use crate::store::StoreError;
use crate::store::CAR_SELECTION_COLLECTION;
use crate::store::STATUS_FIELD;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch car selections. Please try again.";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update car selection. Please try again.";
pub const NO_DATA_MESSAGE: &str = "No car selections available";

//=============================================================================
// Confirmation gate
//=============================================================================

/// A rider decision that has to be confirmed before it is written.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ConfirmAction {
    Accept,
    Decline,
}

impl ConfirmAction {
    pub fn status(&self) -> RequestStatus {
        match self {
            Self::Accept => RequestStatus::Accepted,
            Self::Decline => RequestStatus::Declined,
        }
    }

    /// The question shown in the confirmation prompt.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Accept => "Are you sure you want to accept this car selection?",
            Self::Decline => "Are you sure you want to decline this car selection?",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decision {
    Confirmed,
    Cancelled,
}

/// A status write that the rider has confirmed.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: String,
    pub status: RequestStatus,
}

/// Turns the answer to a confirmation prompt into the write it authorises.
/// A cancelled prompt authorises nothing.
pub fn gate(action: ConfirmAction, id: &str, decision: Decision) -> Option<StatusChange> {
    match decision {
        Decision::Confirmed => Some(StatusChange {
            id: id.to_string(),
            status: action.status(),
        }),
        Decision::Cancelled => None,
    }
}

//=============================================================================
// Notices
//=============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, strum::EnumIs)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissible message reporting the outcome of a status write.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

//=============================================================================
// Screen state
//=============================================================================

/// What the screen shows, recomputed from [`RiderRequestsState`] on every
/// render.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum RenderBranch<'a> {
    Loading,
    Error(&'a str),
    Empty,
    List(&'a [CarSelectionRequest]),
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RiderRequestsState {
    pub loading: bool,
    pub requests: Vec<CarSelectionRequest>,
    pub selected: Option<CarSelectionRequest>,
    pub error: Option<String>,
}

impl Default for RiderRequestsState {
    fn default() -> Self {
        Self {
            loading: true,
            requests: Vec::new(),
            selected: None,
            error: None,
        }
    }
}

impl RiderRequestsState {
    pub fn branch(&self) -> RenderBranch<'_> {
        if self.loading {
            RenderBranch::Loading
        } else if let Some(error) = &self.error {
            RenderBranch::Error(error.as_str())
        } else if self.requests.is_empty() {
            RenderBranch::Empty
        } else {
            RenderBranch::List(self.requests.as_slice())
        }
    }

    pub fn find(&self, id: &str) -> Option<&CarSelectionRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Applies the outcome of the mount-time fetch.
    pub fn apply_fetch(&mut self, result: Result<Vec<CarSelectionRequest>, StoreError>) {
        match result {
            Ok(requests) => {
                self.requests = requests;
                self.error = None;
            }
            Err(_) => {
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        self.loading = false;
    }

    /// Checks a confirmed change against the local list before anything is
    /// written. Returns the notice to show when the change is refused.
    pub fn check_change(&self, change: &StatusChange) -> Result<(), Notice> {
        if change.status.is_pending() {
            return Err(Notice::error(UPDATE_FAILED_MESSAGE));
        }
        if self.find(&change.id).is_none() {
            tracing::warn!("status change for unknown car selection {}", change.id);
            return Err(Notice::error(UPDATE_FAILED_MESSAGE));
        }
        Ok(())
    }

    /// Applies the outcome of a status write and returns the notice to show.
    ///
    /// On success the matching entry's status is patched in place. Accepting
    /// selects the patched entry; declining the selected entry clears the
    /// selection. On failure nothing changes.
    pub fn apply_status_update(
        &mut self,
        change: &StatusChange,
        result: Result<(), StoreError>,
    ) -> Notice {
        if result.is_err() {
            return Notice::error(UPDATE_FAILED_MESSAGE);
        }

        let patched = self
            .requests
            .iter_mut()
            .find(|r| r.id == change.id)
            .map(|r| {
                r.status = change.status;
                r.clone()
            });

        match change.status {
            RequestStatus::Accepted => {
                if let Some(patched) = patched {
                    self.selected = Some(patched);
                }
            }
            RequestStatus::Declined => {
                if self.selected.as_ref().is_some_and(|s| s.id == change.id) {
                    self.selected = None;
                }
            }
            RequestStatus::Pending => {}
        }

        Notice::success(format!("Car selection {}", change.status))
    }

    /// The map for the selected request, if any.
    pub fn map_view(&self, policy: MissingCoordinatePolicy) -> Option<MapView> {
        self.selected
            .as_ref()
            .map(|request| MapView::for_request(request, policy))
    }
}

//=============================================================================
// Card text
//=============================================================================

/// The text lines of one request card.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RequestCardText {
    pub pickup: String,
    pub dropoff: String,
    pub car_type: String,
    pub total_price: String,
    pub distance: String,
}

impl RequestCardText {
    pub fn new(request: &CarSelectionRequest, currency_label: &str) -> Self {
        Self {
            pickup: format!("Pickup: {}", request.pickup_name),
            dropoff: format!("Dropoff: {}", request.dropoff_name),
            car_type: format!("Car Type: {}", request.car_type),
            // f64's Display prints whole values without a trailing ".0"
            total_price: format!("Total Price: {} {}", currency_label, request.total_price),
            distance: format!("Distance: {} km", request.distance),
        }
    }

    pub fn lines(&self) -> [&str; 5] {
        [
            &self.pickup,
            &self.dropoff,
            &self.car_type,
            &self.total_price,
            &self.distance,
        ]
    }
}

//=============================================================================
// Store operations
//=============================================================================

/// Reads every pending request. Called once per mount.
pub async fn fetch_pending<S: RequestStore>(
    store: &S,
) -> Result<Vec<CarSelectionRequest>, StoreError> {
    let result = store
        .query_by_status(CAR_SELECTION_COLLECTION, RequestStatus::Pending)
        .await;
    match &result {
        Ok(requests) if requests.is_empty() => tracing::info!("no pending car selections"),
        Ok(requests) => tracing::info!("fetched {} pending car selections", requests.len()),
        Err(e) => tracing::error!("error fetching car selections: {}", e),
    }
    result
}

/// Writes a confirmed status change. Exactly one store write.
pub async fn write_status<S: RequestStore>(
    store: &S,
    change: &StatusChange,
) -> Result<(), StoreError> {
    let result = store
        .update_field(
            CAR_SELECTION_COLLECTION,
            &change.id,
            STATUS_FIELD,
            Value::String(change.status.as_str().to_string()),
        )
        .await;
    if let Err(e) = &result {
        tracing::error!("error updating car selection {}: {}", change.id, e);
    }
    result
}

/// Loads the pending requests into `state`.
pub async fn load_pending_requests<S: RequestStore>(store: &S, state: &mut RiderRequestsState) {
    let result = fetch_pending(store).await;
    state.apply_fetch(result);
}

/// Checks, writes and applies a confirmed change, returning the notice to
/// show.
pub async fn set_request_status<S: RequestStore>(
    store: &S,
    state: &mut RiderRequestsState,
    change: &StatusChange,
) -> Notice {
    if let Err(notice) = state.check_change(change) {
        return notice;
    }
    let result = write_status(store, change).await;
    state.apply_status_update(change, result)
}
