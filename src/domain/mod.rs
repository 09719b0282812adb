// SPDX-License-Identifier: MPL-2.0
//! Domain layer - value objects with ZERO external dependencies.
//!
//! This module contains pure domain types that enforce their own validity.
//! It has no dependencies on external crates (except `std`) to ensure
//! testability and architectural purity.
//!
//! # Modules
//!
//! - [`diagnostics`]: Diagnostics types ([`BufferCapacity`](diagnostics::BufferCapacity))
//! - [`feedback`]: Lifecycle limits ([`MaxVisible`](feedback::MaxVisible),
//!   [`QueueCapacity`](feedback::QueueCapacity))

pub mod diagnostics;
pub mod feedback;
