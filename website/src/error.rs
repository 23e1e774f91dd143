use axum::http::{self, StatusCode};
use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use snafu::{Backtrace, ErrorCompat, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

pub const UPSTREAM_FAILED: &str = "API request failed";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Error reading config file: {}", source))]
    ConfigFile {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Error parsing config file: {}", source))]
    ConfigParse {
        source: toml::de::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Config error: {}", msg))]
    Config { msg: String },

    #[snafu(display("Unable to bind {}: {}", addr, source))]
    ServerBind {
        addr: String,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("HTTP server error: {}", source))]
    Serve {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Failed to render template: {}", source))]
    Template {
        source: askama::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Response builder error: {}", source))]
    ResponseBuilder {
        source: http::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Unable to build HTTP client: {}", source))]
    HttpClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("{}: {}", msg, source))]
    HttpClient {
        msg: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("{}: upstream responded with {}", UPSTREAM_FAILED, status))]
    UpstreamStatus { status: StatusCode },

    #[snafu(display("{}: {}", msg, source))]
    HttpResponseParse {
        msg: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("{}: {}", UPSTREAM_FAILED, msg))]
    UpstreamRejected { msg: String },

    #[snafu(display("{}", msg))]
    BadRequest { msg: String },

    #[snafu(display("{}", msg))]
    NotFound { msg: String },
}

impl Error {
    /// True when the catalog could not be reached or answered with garbage.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::HttpClient { .. }
                | Error::UpstreamStatus { .. }
                | Error::HttpResponseParse { .. }
                | Error::UpstreamRejected { .. }
        )
    }

    /// Text shown to the visitor.
    pub fn public_message(&self) -> String {
        match self {
            Error::NotFound { .. } => self.to_string(),
            e if e.is_upstream() => e.to_string(),
            e => format!("Error fetching data: {}", e),
        }
    }
}

/// Allow Error to be converted to StatusCode
impl From<&Error> for StatusCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Allow errors to be rendered as response
impl IntoResponse for Error {
    fn into_response(self) -> Response<Body> {
        let mut info = ErrorInfo::from(&self);
        if let Some(bt) = ErrorCompat::backtrace(&self) {
            info.backtrace = Some(format!("{}", bt));
        }

        // The response mapper turns the extension into the real body
        let mut res = Response::new(Body::empty());
        *res.status_mut() = info.status_code;
        res.extensions_mut().insert(info);

        res
    }
}

#[derive(Clone, Debug)]
pub struct ErrorInfo {
    pub status_code: StatusCode,
    pub message: String,
    pub backtrace: Option<String>,
}

impl From<&Error> for ErrorInfo {
    fn from(e: &Error) -> Self {
        Self {
            status_code: e.into(),
            message: e.public_message(),
            backtrace: None,
        }
    }
}
