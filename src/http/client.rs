use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use url::Url;

use crate::{
    args::{BarrageArgs, DEFAULT_USER_AGENT},
    error::{AppError, AppResult, HttpError, ValidationError},
};

/// Builds the shared client: timeouts, default headers and TLS material.
///
/// # Errors
///
/// Returns an error when a header is malformed, TLS files cannot be read or
/// parsed, or the client cannot be built.
pub(crate) fn build_client(args: &BarrageArgs) -> AppResult<Client> {
    let mut client_builder = Client::builder()
        .timeout(args.request_timeout)
        .connect_timeout(args.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(build_headers(&args.headers)?);

    if let Some(path) = args.cacert.as_ref() {
        let bytes = std::fs::read(path).map_err(|err| {
            AppError::http(HttpError::ReadCacert {
                path: path.clone().into(),
                source: err,
            })
        })?;
        let cert = reqwest::Certificate::from_pem(&bytes).map_err(|err| {
            AppError::http(HttpError::InvalidCacert {
                path: path.clone().into(),
                source: err,
            })
        })?;
        client_builder = client_builder.add_root_certificate(cert);
    }

    if args.cert.is_some() || args.key.is_some() {
        let cert_path = args
            .cert
            .as_ref()
            .ok_or_else(|| AppError::validation(ValidationError::KeyWithoutCert))?;
        let key_path = args
            .key
            .as_ref()
            .ok_or_else(|| AppError::validation(ValidationError::CertWithoutKey))?;
        let cert_bytes = std::fs::read(cert_path).map_err(|err| {
            AppError::http(HttpError::ReadCert {
                path: cert_path.clone().into(),
                source: err,
            })
        })?;
        let key_bytes = std::fs::read(key_path).map_err(|err| {
            AppError::http(HttpError::ReadKey {
                path: key_path.clone().into(),
                source: err,
            })
        })?;
        let identity = reqwest::Identity::from_pkcs8_pem(&cert_bytes, &key_bytes)
            .map_err(|err| AppError::http(HttpError::InvalidIdentity { source: err }))?;
        client_builder = client_builder.identity(identity);
    }

    if args.insecure {
        client_builder = client_builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    client_builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

/// Joins the configured path onto the endpoint.
///
/// # Errors
///
/// Returns an error when the endpoint is missing, unparsable, not http(s), or
/// the path cannot be joined.
pub(crate) fn resolve_url(endpoint: Option<&str>, path: &str) -> AppResult<Url> {
    let endpoint = endpoint.ok_or_else(|| AppError::validation(ValidationError::MissingEndpoint))?;
    let base = Url::parse(endpoint).map_err(|err| {
        AppError::http(HttpError::InvalidEndpoint {
            url: endpoint.to_owned(),
            source: err,
        })
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(AppError::http(HttpError::UnsupportedScheme {
            url: endpoint.to_owned(),
        }));
    }
    if path.is_empty() {
        return Ok(base);
    }
    base.join(path).map_err(|err| {
        AppError::http(HttpError::JoinPath {
            url: endpoint.to_owned(),
            path: path.to_owned(),
            source: err,
        })
    })
}

/// Returns the request body: the file contents when `--data-file` is set,
/// otherwise `--data`.
///
/// # Errors
///
/// Returns an error when the payload file cannot be read.
pub(crate) fn resolve_payload(args: &BarrageArgs) -> AppResult<String> {
    match args.data_file.as_ref() {
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            AppError::http(HttpError::ReadPayload {
                path: path.clone().into(),
                source: err,
            })
        }),
        None => Ok(args.data.clone()),
    }
}

fn build_headers(headers: &[(String, String)]) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len().saturating_add(1));
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            AppError::http(HttpError::InvalidHeader {
                name: key.clone(),
                reason: err.to_string(),
            })
        })?;
        let val = HeaderValue::from_str(value).map_err(|err| {
            AppError::http(HttpError::InvalidHeader {
                name: key.clone(),
                reason: err.to_string(),
            })
        })?;
        map.append(name, val);
    }
    if !map.contains_key(CONTENT_TYPE) {
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(map)
}
