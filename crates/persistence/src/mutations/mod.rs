// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side persistence operations.

pub mod operators;
pub mod records;

pub use records::{delete_record, insert_record, set_attachment, update_record};
