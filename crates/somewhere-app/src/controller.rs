//! Pending-spot state machine.
//!
//! At most one draft exists at a time. Photo uploads run outside the controller
//! and report back through a [`PhotoTicket`]; a ticket issued for an older
//! selection or a discarded draft is stale and its result is dropped.

use std::time::Duration;

use somewhere_core::constants::{DEFAULT_REGION, REQUEST_TIMEOUT_SECS};
use somewhere_core::{
    BoundingRegion, CommittedSpot, Coordinate, CreateSpotRequest, ErrorMetadata, MediaFile,
    PhotoAttachment, SpotBackend, SpotError, SpotResult,
};
use somewhere_processing::UploadOrchestrator;

use crate::collection::SpotCollection;

/// Screen position of the draft popup. Carried for the UI only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenAnchor {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Uploaded,
    /// Human-readable reason of the last failed selection
    Failed(String),
}

/// The single in-progress draft.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSpot {
    coordinate: Coordinate,
    screen_anchor: ScreenAnchor,
    description: String,
    photo: Option<PhotoAttachment>,
    upload_status: UploadStatus,
}

impl PendingSpot {
    fn new(coordinate: Coordinate, screen_anchor: ScreenAnchor) -> Self {
        Self {
            coordinate,
            screen_anchor,
            description: String::new(),
            photo: None,
            upload_status: UploadStatus::Idle,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn screen_anchor(&self) -> ScreenAnchor {
        self.screen_anchor
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Key of the uploaded photo, if the attached photo was uploaded.
    pub fn photo_key(&self) -> Option<&str> {
        match &self.photo {
            Some(PhotoAttachment::Stored(uploaded)) => Some(&uploaded.key),
            _ => None,
        }
    }

    /// Data URL of the attached photo, if it is embedded inline.
    pub fn inline_photo(&self) -> Option<&str> {
        match &self.photo {
            Some(PhotoAttachment::Inline(inline)) => Some(&inline.data_url),
            _ => None,
        }
    }

    pub fn upload_status(&self) -> &UploadStatus {
        &self.upload_status
    }

    fn to_request(&self) -> CreateSpotRequest {
        CreateSpotRequest {
            coordinate: self.coordinate,
            description: self.description.clone(),
            photo_key: self.photo_key().map(str::to_string),
            photo: self.inline_photo().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Empty,
    Drafting,
    Submitting,
}

/// Identifies one photo selection on one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoTicket {
    generation: u64,
    attempt: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOutcome {
    Applied,
    /// The draft was discarded or a newer selection superseded this one
    Stale,
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("No spot is being drafted")]
    NoDraft,

    #[error("The spot is already being submitted")]
    Busy,

    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("A photo upload is still in progress")]
    UploadInFlight,

    #[error(transparent)]
    Spot(#[from] SpotError),
}

impl ControllerError {
    /// Message suitable for showing to the user.
    pub fn user_notice(&self) -> String {
        match self {
            ControllerError::Spot(e) => e.client_message(),
            ControllerError::NoDraft => "Click inside the map region to place a spot.".to_string(),
            ControllerError::Busy => "Please wait for the spot to finish saving.".to_string(),
            ControllerError::EmptyDescription => "Add a description before saving.".to_string(),
            ControllerError::UploadInFlight => {
                "Please wait for the photo upload to finish.".to_string()
            }
        }
    }
}

enum Draft {
    Empty,
    Drafting(PendingSpot),
    Submitting(PendingSpot),
}

pub struct PendingSpotController {
    region: BoundingRegion,
    draft: Draft,
    spots: SpotCollection,
    request_timeout: Duration,
    /// Bumped whenever a draft is created or discarded
    generation: u64,
    attempts: u64,
    in_flight: Option<PhotoTicket>,
}

impl PendingSpotController {
    pub fn new(region: BoundingRegion, spots: SpotCollection) -> Self {
        Self {
            region,
            draft: Draft::Empty,
            spots,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            generation: 0,
            attempts: 0,
            in_flight: None,
        }
    }

    /// Bound on the create-spot call made by [`submit`](Self::submit).
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn state(&self) -> ControllerState {
        match self.draft {
            Draft::Empty => ControllerState::Empty,
            Draft::Drafting(_) => ControllerState::Drafting,
            Draft::Submitting(_) => ControllerState::Submitting,
        }
    }

    pub fn pending(&self) -> Option<&PendingSpot> {
        match &self.draft {
            Draft::Empty => None,
            Draft::Drafting(spot) | Draft::Submitting(spot) => Some(spot),
        }
    }

    pub fn spots(&self) -> &SpotCollection {
        &self.spots
    }

    fn drafting_mut(&mut self) -> Result<&mut PendingSpot, ControllerError> {
        match &mut self.draft {
            Draft::Drafting(spot) => Ok(spot),
            Draft::Submitting(_) => Err(ControllerError::Busy),
            Draft::Empty => Err(ControllerError::NoDraft),
        }
    }

    fn discard_uploads(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    /// Start a draft at `coordinate`. An out-of-region click changes nothing
    /// and returns [`SpotError::GeofenceRejected`]. A valid click while
    /// drafting replaces the current draft.
    pub fn place(
        &mut self,
        coordinate: Coordinate,
        anchor: ScreenAnchor,
    ) -> Result<&PendingSpot, ControllerError> {
        if matches!(self.draft, Draft::Submitting(_)) {
            return Err(ControllerError::Busy);
        }

        if !self.region.contains(coordinate) {
            let err = SpotError::GeofenceRejected {
                lat: coordinate.lat,
                lng: coordinate.lng,
            };
            err.log("Placement rejected");
            return Err(err.into());
        }

        if matches!(self.draft, Draft::Drafting(_)) {
            tracing::debug!("Replacing existing draft");
        }
        self.discard_uploads();
        self.draft = Draft::Drafting(PendingSpot::new(coordinate, anchor));
        tracing::info!(lat = coordinate.lat, lng = coordinate.lng, "Draft placed");

        self.pending().ok_or(ControllerError::NoDraft)
    }

    pub fn edit_description(&mut self, text: impl Into<String>) -> Result<(), ControllerError> {
        let spot = self.drafting_mut()?;
        spot.description = text.into();
        Ok(())
    }

    /// Mark the draft as uploading and issue the ticket the result must be
    /// reported with. Any earlier ticket becomes stale.
    pub fn begin_photo_selection(&mut self) -> Result<PhotoTicket, ControllerError> {
        let generation = self.generation;
        let spot = self.drafting_mut()?;
        spot.upload_status = UploadStatus::Uploading;

        self.attempts += 1;
        let ticket = PhotoTicket {
            generation,
            attempt: self.attempts,
        };
        if self.in_flight.replace(ticket).is_some() {
            tracing::debug!(attempt = ticket.attempt, "Superseding in-flight photo upload");
        }
        Ok(ticket)
    }

    /// Apply an upload result if `ticket` is still the current selection on
    /// the current draft. A failure keeps the previously uploaded photo.
    pub fn complete_photo_selection<P: Into<PhotoAttachment>>(
        &mut self,
        ticket: PhotoTicket,
        result: SpotResult<P>,
    ) -> PhotoOutcome {
        if self.in_flight != Some(ticket) || ticket.generation != self.generation {
            tracing::warn!(
                attempt = ticket.attempt,
                succeeded = result.is_ok(),
                "Discarding stale photo upload result"
            );
            return PhotoOutcome::Stale;
        }

        let Draft::Drafting(spot) = &mut self.draft else {
            tracing::warn!(attempt = ticket.attempt, "Photo result arrived without a draft");
            return PhotoOutcome::Stale;
        };
        self.in_flight = None;

        match result {
            Ok(photo) => {
                let photo: PhotoAttachment = photo.into();
                match &photo {
                    PhotoAttachment::Stored(uploaded) => {
                        tracing::info!(key = %uploaded.key, "Uploaded photo attached to draft")
                    }
                    PhotoAttachment::Inline(inline) => tracing::info!(
                        size_bytes = inline.size_bytes,
                        "Inline photo attached to draft"
                    ),
                }
                spot.photo = Some(photo);
                spot.upload_status = UploadStatus::Uploaded;
            }
            Err(e) => {
                e.log("Photo upload failed");
                spot.upload_status = UploadStatus::Failed(e.to_string());
            }
        }
        PhotoOutcome::Applied
    }

    /// Run the photo pipeline for `file` and apply its result.
    pub async fn select_photo(
        &mut self,
        orchestrator: &UploadOrchestrator,
        file: MediaFile,
    ) -> Result<PhotoOutcome, ControllerError> {
        let ticket = self.begin_photo_selection()?;
        let result = orchestrator.attach(file).await;
        Ok(self.complete_photo_selection(ticket, result))
    }

    /// Discard the draft. Returns whether there was one to discard; a draft
    /// that is being submitted is kept.
    pub fn cancel(&mut self) -> bool {
        match self.draft {
            Draft::Drafting(_) => {
                self.draft = Draft::Empty;
                self.discard_uploads();
                tracing::info!("Draft cancelled");
                true
            }
            Draft::Submitting(_) => {
                tracing::debug!("Ignoring cancel while submitting");
                false
            }
            Draft::Empty => false,
        }
    }

    /// Validate the draft and move it to Submitting. Returns the payload to
    /// persist.
    pub fn begin_submit(&mut self) -> Result<CreateSpotRequest, ControllerError> {
        let spot = self.drafting_mut()?;
        if spot.description.trim().is_empty() {
            return Err(ControllerError::EmptyDescription);
        }
        if spot.upload_status == UploadStatus::Uploading {
            return Err(ControllerError::UploadInFlight);
        }
        let request = spot.to_request();

        if let Draft::Drafting(spot) = std::mem::replace(&mut self.draft, Draft::Empty) {
            self.draft = Draft::Submitting(spot);
        }
        Ok(request)
    }

    /// Conclude a submit. Success appends to the collection and clears the
    /// draft; failure returns the draft to Drafting unchanged.
    pub fn finish_submit(
        &mut self,
        result: SpotResult<CommittedSpot>,
    ) -> Result<CommittedSpot, ControllerError> {
        let spot = match std::mem::replace(&mut self.draft, Draft::Empty) {
            Draft::Submitting(spot) => spot,
            other => {
                self.draft = other;
                return Err(ControllerError::NoDraft);
            }
        };

        match result {
            Ok(committed) => {
                self.discard_uploads();
                self.spots.push(committed.clone());
                tracing::info!(
                    lat = committed.coordinate.lat,
                    lng = committed.coordinate.lng,
                    total = self.spots.len(),
                    "Spot committed"
                );
                Ok(committed)
            }
            Err(e) => {
                e.log("Spot submit failed");
                self.draft = Draft::Drafting(spot);
                Err(e.into())
            }
        }
    }

    /// Persist the draft through `backend`.
    pub async fn submit(
        &mut self,
        backend: &dyn SpotBackend,
    ) -> Result<CommittedSpot, ControllerError> {
        let request = self.begin_submit()?;
        let result = match tokio::time::timeout(self.request_timeout, backend.create_spot(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SpotError::Persist(format!(
                "create spot request timed out after {:?}",
                self.request_timeout
            ))),
        };
        self.finish_submit(result)
    }
}

impl Default for PendingSpotController {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, SpotCollection::default())
    }
}
