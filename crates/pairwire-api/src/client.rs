// Hand-crafted async HTTP client for a Nautobot-style inventory REST API.
//
// Base path: /api/
// Auth: `Authorization: Token <token>` header

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    CableCreate, CableResponse, DeviceCreate, DeviceResponse, InterfaceResponse,
    IpAddressCreate, IpAddressResponse, IpAddressToInterfaceCreate, IpAddressToInterfaceResponse,
    NamedResponse, Page, PrefixCreate, PrefixResponse, StatusResponse,
};

/// Page size requested from list endpoints.
pub const PAGE_SIZE: u32 = 250;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the inventory REST API.
///
/// Uses token authentication and communicates via JSON REST endpoints
/// under `/api/`. Every list helper walks the `{count, next, results}`
/// envelope to completion before returning.
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl InventoryClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects `Authorization: Token <token>` as a default header on
    /// every request.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized API root (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `/api/` unless the caller already pointed at it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"dcim/devices/"`) onto the API root.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Error::PermissionDenied {
                message: flatten_error_body(&raw).unwrap_or_else(|| status.to_string()),
            };
        }

        Error::Api {
            status: status.as_u16(),
            message: flatten_error_body(&raw).unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            }),
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect every page of a list endpoint into a single `Vec<T>`.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let mut params = filters.to_vec();
            params.push(("limit", PAGE_SIZE.to_string()));
            params.push(("offset", offset.to_string()));

            let page: Page<T> = self.get_with_params(path, &params).await?;
            let received = u64::try_from(page.results.len()).unwrap_or(u64::MAX);
            all.extend(page.results);

            let collected = u64::try_from(all.len()).unwrap_or(u64::MAX);
            if page.next.is_none() || received == 0 || collected >= page.count {
                break;
            }

            offset += received;
        }

        Ok(all)
    }

    /// Fetch at most one record matching the filters.
    async fn first<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let mut params = filters.to_vec();
        params.push(("limit", "1".into()));
        let page: Page<T> = self.get_with_params(path, &params).await?;
        Ok(page.results.into_iter().next())
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Vocabulary ───────────────────────────────────────────────────

    /// Look up a lifecycle status by exact name.
    pub async fn find_status(&self, name: &str) -> Result<Option<StatusResponse>, Error> {
        let found: Option<StatusResponse> =
            self.first("extras/statuses/", &[("name", name.to_owned())]).await?;
        Ok(found.filter(|s| s.name == name))
    }

    pub async fn find_location(&self, name: &str) -> Result<Option<NamedResponse>, Error> {
        self.first("dcim/locations/", &[("name", name.to_owned())])
            .await
    }

    /// Device types are keyed by `model`, not `name`.
    pub async fn find_device_type(&self, model: &str) -> Result<Option<NamedResponse>, Error> {
        self.first("dcim/device-types/", &[("model", model.to_owned())])
            .await
    }

    pub async fn find_role(&self, name: &str) -> Result<Option<NamedResponse>, Error> {
        self.first("extras/roles/", &[("name", name.to_owned())])
            .await
    }

    // ── Devices & interfaces ─────────────────────────────────────────

    pub async fn create_device(&self, body: &DeviceCreate) -> Result<DeviceResponse, Error> {
        self.post("dcim/devices/", body).await
    }

    /// Every interface on a device, in whatever order the store returns.
    pub async fn list_interfaces(&self, device_id: &Uuid) -> Result<Vec<InterfaceResponse>, Error> {
        self.list_all("dcim/interfaces/", &[("device_id", device_id.to_string())])
            .await
    }

    // ── Cables ───────────────────────────────────────────────────────

    pub async fn create_cable(&self, body: &CableCreate) -> Result<CableResponse, Error> {
        self.post("dcim/cables/", body).await
    }

    // ── Prefixes ─────────────────────────────────────────────────────

    /// Look up a prefix by its exact CIDR.
    pub async fn find_prefix(&self, prefix: &str) -> Result<Option<PrefixResponse>, Error> {
        let found: Option<PrefixResponse> = self
            .first("ipam/prefixes/", &[("prefix", prefix.to_owned())])
            .await?;
        Ok(found.filter(|p| p.prefix == prefix))
    }

    pub async fn create_prefix(&self, body: &PrefixCreate) -> Result<PrefixResponse, Error> {
        self.post("ipam/prefixes/", body).await
    }

    // ── IP addresses ─────────────────────────────────────────────────

    /// Whether any address record exists for `host`, whatever its mask.
    pub async fn ip_address_exists(&self, host: &str) -> Result<bool, Error> {
        let page: Page<IpAddressResponse> = self
            .get_with_params(
                "ipam/ip-addresses/",
                &[("address", host.to_owned()), ("limit", "1".into())],
            )
            .await?;
        Ok(page.count > 0)
    }

    /// Every address record contained in `prefix`.
    pub async fn list_ip_addresses_within(
        &self,
        prefix: &str,
    ) -> Result<Vec<IpAddressResponse>, Error> {
        self.list_all("ipam/ip-addresses/", &[("prefix", prefix.to_owned())])
            .await
    }

    /// Address records bound to an interface.
    pub async fn list_interface_ip_addresses(
        &self,
        interface_id: &Uuid,
    ) -> Result<Vec<IpAddressResponse>, Error> {
        self.list_all(
            "ipam/ip-addresses/",
            &[("interfaces", interface_id.to_string())],
        )
        .await
    }

    pub async fn create_ip_address(
        &self,
        body: &IpAddressCreate,
    ) -> Result<IpAddressResponse, Error> {
        self.post("ipam/ip-addresses/", body).await
    }

    /// Associate an address with an interface.
    pub async fn assign_ip_address(
        &self,
        ip_address: Uuid,
        interface: Uuid,
    ) -> Result<IpAddressToInterfaceResponse, Error> {
        self.post(
            "ipam/ip-address-to-interface/",
            &IpAddressToInterfaceCreate {
                ip_address,
                interface,
            },
        )
        .await
    }
}

// ── Error body flattening ────────────────────────────────────────────

/// Collapse the store's error payload into one line.
///
/// Handles `{"detail": "..."}`, field maps like
/// `{"name": ["...already exists."]}`, and bare string arrays.
fn flatten_error_body(raw: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let text = match value {
        Value::Object(map) => {
            if let Some(Value::String(detail)) = map.get("detail") {
                return Some(detail.clone());
            }
            map.iter()
                .map(|(field, msgs)| {
                    let msgs = join_messages(msgs);
                    if field == "__all__" || field == "non_field_errors" {
                        msgs
                    } else {
                        format!("{field}: {msgs}")
                    }
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
        other @ Value::Array(_) => join_messages(&other),
        Value::String(s) => s,
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn join_messages(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(join_messages).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}
