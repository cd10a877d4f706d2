// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Booking repository and lifecycle state machine.
//!
//! A booking walks a fixed status progression:
//!
//! ```text
//! pending_payment -> assigned_pending -> assigned -> planning
//!   -> materials_prepared -> on_the_way -> setup_in_progress -> completed
//! ```
//!
//! `cancelled` is reachable from any non-terminal state. `completed` and
//! `cancelled` are terminal. The `pending_payment -> assigned_pending` edge
//! is owned by checkout reconciliation and never taken by a direct API write.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Booking status vocabulary. Any value outside this set is rejected at the
/// API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    AssignedPending,
    Assigned,
    Planning,
    MaterialsPrepared,
    OnTheWay,
    SetupInProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Parse a status from its wire name.
    pub fn from_str(s: &str) -> Option<BookingStatus> {
        match s {
            "pending_payment" => Some(BookingStatus::PendingPayment),
            "assigned_pending" => Some(BookingStatus::AssignedPending),
            "assigned" => Some(BookingStatus::Assigned),
            "planning" => Some(BookingStatus::Planning),
            "materials_prepared" => Some(BookingStatus::MaterialsPrepared),
            "on_the_way" => Some(BookingStatus::OnTheWay),
            "setup_in_progress" => Some(BookingStatus::SetupInProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::AssignedPending => "assigned_pending",
            BookingStatus::Assigned => "assigned",
            BookingStatus::Planning => "planning",
            BookingStatus::MaterialsPrepared => "materials_prepared",
            BookingStatus::OnTheWay => "on_the_way",
            BookingStatus::SetupInProgress => "setup_in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// No transitions leave a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Operational states a decorator may move a booking into.
    pub fn is_decorator_target(&self) -> bool {
        matches!(
            self,
            BookingStatus::Planning
                | BookingStatus::MaterialsPrepared
                | BookingStatus::OnTheWay
                | BookingStatus::SetupInProgress
                | BookingStatus::Completed
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the booking has been paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Paid,
}

/// Rejected lifecycle transitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Booking is already {0}")]
    Terminal(BookingStatus),

    #[error("decoratorId, decoratorName and decoratorEmail are required")]
    MissingDecorator,

    #[error("Invalid status: {0}")]
    InvalidTarget(String),
}

/// Booking stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredBooking {
    /// Unique booking identifier (UUID)
    pub id: String,
    /// Booking owner's account email
    pub user_email: String,
    /// Booked service id
    pub service_id: String,
    /// Booked service name (denormalized for checkout line items)
    pub service_name: String,
    /// Date of the event
    pub event_date: NaiveDate,
    /// Price agreed at booking time, major currency units
    pub cost: f64,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Payment progress
    pub payment_status: PaymentState,
    /// Assigned decorator identity, set by admin assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator_email: Option<String>,
    /// Tracking identifier issued on payment confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

impl StoredBooking {
    /// Cancel the booking (owner or admin action).
    ///
    /// Returns `Ok(false)` when the booking was already cancelled: re-cancel
    /// is a no-op, not an error. Cancelling a completed booking fails.
    pub fn cancel(&mut self) -> Result<bool, LifecycleError> {
        match self.status {
            BookingStatus::Cancelled => Ok(false),
            BookingStatus::Completed => Err(LifecycleError::Terminal(self.status)),
            _ => {
                self.status = BookingStatus::Cancelled;
                Ok(true)
            }
        }
    }

    /// Attach a decorator (admin action). All three identity fields must be
    /// non-empty; on failure the booking is left untouched.
    pub fn assign(
        &mut self,
        decorator_id: &str,
        decorator_name: &str,
        decorator_email: &str,
    ) -> Result<(), LifecycleError> {
        if self.status.is_terminal() {
            return Err(LifecycleError::Terminal(self.status));
        }
        if decorator_id.trim().is_empty()
            || decorator_name.trim().is_empty()
            || decorator_email.trim().is_empty()
        {
            return Err(LifecycleError::MissingDecorator);
        }

        self.decorator_id = Some(decorator_id.to_string());
        self.decorator_name = Some(decorator_name.to_string());
        self.decorator_email = Some(decorator_email.to_string());
        self.status = BookingStatus::Assigned;
        Ok(())
    }

    /// Move the booking into an operational state (decorator action).
    ///
    /// The raw value is validated against the status vocabulary first, then
    /// against the decorator allow-list; `pending_payment`,
    /// `assigned_pending`, `assigned` and `cancelled` are never reachable
    /// this way.
    pub fn advance(&mut self, raw_target: &str) -> Result<BookingStatus, LifecycleError> {
        let target = BookingStatus::from_str(raw_target)
            .ok_or_else(|| LifecycleError::InvalidTarget(raw_target.to_string()))?;

        if self.status.is_terminal() {
            return Err(LifecycleError::Terminal(self.status));
        }
        if !target.is_decorator_target() {
            return Err(LifecycleError::InvalidTarget(raw_target.to_string()));
        }

        self.status = target;
        Ok(target)
    }

    /// Apply a confirmed payment (reconciliation only).
    pub fn confirm_payment(&mut self, tracking_id: &str) {
        self.status = BookingStatus::AssignedPending;
        self.payment_status = PaymentState::Paid;
        self.tracking_id = Some(tracking_id.to_string());
    }
}

/// Listing filter for bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Restrict to a single owner's bookings
    pub user_email: Option<String>,
    /// Restrict to a single status
    pub status: Option<BookingStatus>,
}

/// Sort order for booking listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingSort {
    /// Event date, latest event first
    EventDate,
    /// Status name, ascending
    Status,
    /// Creation time, newest first (default)
    CreatedAt,
}

impl BookingSort {
    pub fn from_query(sort_by: Option<&str>) -> BookingSort {
        match sort_by {
            Some("date") => BookingSort::EventDate,
            Some("status") => BookingSort::Status,
            _ => BookingSort::CreatedAt,
        }
    }
}

/// Repository for booking operations.
pub struct BookingRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> BookingRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Get a booking by ID.
    pub fn get(&self, booking_id: &str) -> StorageResult<StoredBooking> {
        let path = self.storage.paths().booking(booking_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Booking {booking_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new booking.
    pub fn create(&self, booking: &StoredBooking) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().booking(&booking.id), booking)
    }

    /// Persist a mutated booking.
    pub fn update(&self, booking: &StoredBooking) -> StorageResult<()> {
        let path = self.storage.paths().booking(&booking.id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Booking {}", booking.id)));
        }
        self.storage.write_json(path, booking)
    }

    /// List bookings matching the filter, in the requested order.
    pub fn list(&self, filter: &BookingFilter, sort: BookingSort) -> StorageResult<Vec<StoredBooking>> {
        let mut bookings = self.list_all()?;

        if let Some(email) = &filter.user_email {
            bookings.retain(|booking| booking.user_email.eq_ignore_ascii_case(email));
        }
        if let Some(status) = filter.status {
            bookings.retain(|booking| booking.status == status);
        }

        match sort {
            BookingSort::EventDate => {
                bookings.sort_by(|a, b| b.event_date.cmp(&a.event_date));
            }
            BookingSort::Status => {
                bookings.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str()));
            }
            BookingSort::CreatedAt => {
                bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
        }
        Ok(bookings)
    }

    /// A decorator's assigned bookings, soonest event first.
    pub fn list_by_decorator(&self, decorator_email: &str) -> StorageResult<Vec<StoredBooking>> {
        let mut bookings = self.list_all()?;
        bookings.retain(|booking| {
            booking
                .decorator_email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(decorator_email))
        });
        bookings.sort_by(|a, b| a.event_date.cmp(&b.event_date));
        Ok(bookings)
    }

    /// All bookings (admin analytics).
    pub fn list_all(&self) -> StorageResult<Vec<StoredBooking>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().bookings_dir(), "json")?;

        let mut bookings = Vec::new();
        for id in ids {
            if let Ok(booking) = self.get(&id) {
                bookings.push(booking);
            }
        }
        Ok(bookings)
    }
}
