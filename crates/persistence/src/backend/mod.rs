// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend utilities.
//!
//! Only `SQLite` is supported. Backend-specific code (connection
//! initialization, PRAGMA statements, `last_insert_rowid()`) lives here;
//! all domain queries and mutations use backend-agnostic Diesel DSL.

pub mod sqlite;
