//! The `{ "data": ... }` envelope wrapped around every successful JSON body.
//! Errors use `{ "error", "code" }` instead (see [`crate::error::AppError`]).

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
