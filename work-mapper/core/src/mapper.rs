// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ArgumentLists, MapperError};

/// Applies one function to batches of argument rows.
///
/// `init()` and `cleanup()` bracket a session; callers are expected to run
/// `cleanup()` even when `map()` failed. Results always come back in the
/// order of the input rows.
pub trait Mapper<A> {
    type Output;

    fn init(&mut self) -> Result<(), MapperError>;

    fn map<L>(&mut self, lists: L) -> Result<Vec<Self::Output>, MapperError>
    where
        L: ArgumentLists<Row = A>;

    fn cleanup(&mut self) -> Result<(), MapperError>;
}
