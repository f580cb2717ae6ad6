// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules for upload handling, decoding and measurement.

pub mod decode;
pub mod encode;
pub mod measurement;
pub mod upload;

pub use measurement::{run_mask_export, run_measurement, run_surface_masks, MeasureJob};
pub use upload::UploadFields;
