//! Request methods and response statuses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request method a handler can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        })
    }
}

/// Outcome of a request, mirroring the `CoAP` response classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// 2.05 Content.
    Ok,
    /// 2.04 Changed.
    Changed,
    /// 4.00 Bad Request.
    BadRequest,
    /// 4.04 Not Found.
    NotFound,
    /// 4.05 Method Not Allowed.
    MethodNotAllowed,
    /// 5.00 Internal Server Error.
    InternalServerError,
}

impl Status {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Changed)
    }

    /// `CoAP` response code in `class.detail` form.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Ok => "2.05",
            Self::Changed => "2.04",
            Self::BadRequest => "4.00",
            Self::NotFound => "4.04",
            Self::MethodNotAllowed => "4.05",
            Self::InternalServerError => "5.00",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "ok",
            Self::Changed => "changed",
            Self::BadRequest => "bad request",
            Self::NotFound => "not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::InternalServerError => "internal server error",
        };
        write!(f, "{} {text}", self.code())
    }
}
