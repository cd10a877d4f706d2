// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 StyleDecor

//! Typed repositories over the document store, one per collection.

pub mod applications;
pub mod bookings;
pub mod decorators;
pub mod payments;
pub mod services;
pub mod users;

pub use applications::{ApplicationRepository, ApplicationStatus, StoredApplication};
pub use bookings::{
    BookingFilter, BookingRepository, BookingSort, BookingStatus, LifecycleError, PaymentState,
    StoredBooking,
};
pub use decorators::{
    DecoratorFilter, DecoratorProfile, DecoratorRepository, DecoratorStatus, StoredDecorator,
    DEFAULT_RATING,
};
pub use payments::{PaymentRepository, StoredPayment};
pub use services::{ServiceFilter, ServiceRepository, ServiceUpdate, StoredService};
pub use users::{StoredUser, UserRepository, USER_SEARCH_LIMIT};
