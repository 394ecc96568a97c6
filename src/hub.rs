//! `DriveApi` backed by the Google Drive v3 API through `google-drive3`.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use google_drive3 as drive3;
use drive3::api::{Permission, Scope};
use drive3::hyper::client::HttpConnector;
use drive3::hyper_rustls::HttpsConnector;
use drive3::{hyper, hyper_rustls, oauth2, DriveHub};
use tracing::{debug, info};

use crate::api::{ChildPage, DriveApi, PermissionEntry, RemoteItem};
use crate::error::{Error, Result};

pub const SERVICE_ACCOUNT_KEY_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";

const ITEM_FIELDS: &str = "id, name, mimeType, size";
const CHILDREN_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size)";
const PERMISSION_FIELDS: &str = "permissions(emailAddress, role, displayName)";

pub type Hub = DriveHub<HttpsConnector<HttpConnector>>;

pub struct HubClient {
    hub: Hub,
}

impl HubClient {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    /// Authenticates with the service account key stored base64-encoded in
    /// `GOOGLE_SERVICE_ACCOUNT_KEY`. With `subject` set, the service account
    /// acts on behalf of that user through domain-wide delegation.
    pub async fn from_env(subject: Option<&str>) -> Result<Self> {
        let encoded = std::env::var(SERVICE_ACCOUNT_KEY_VAR).map_err(|_| {
            Error::Credentials(format!("{SERVICE_ACCOUNT_KEY_VAR} is not set"))
        })?;

        let decoded = URL_SAFE
            .decode(encoded.trim().as_bytes())
            .map_err(|e| Error::Credentials(format!("failed to decode key: {e}")))?;
        let key_json = String::from_utf8(decoded)
            .map_err(|e| Error::Credentials(format!("key is not valid UTF-8: {e}")))?;

        let service_account = oauth2::parse_service_account_key(&key_json)
            .map_err(|e| Error::Credentials(format!("failed to parse key: {e}")))?;

        let mut builder = oauth2::ServiceAccountAuthenticator::builder(service_account);
        if let Some(subject) = subject {
            info!("Acting on behalf of {}", subject);
            builder = builder.subject(subject);
        }
        let auth = builder
            .build()
            .await
            .map_err(|e| Error::Credentials(format!("failed to create authenticator: {e}")))?;

        let client = hyper::Client::builder().build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .https_or_http()
                .enable_http1()
                .build(),
        );

        Ok(Self::new(DriveHub::new(client, auth)))
    }
}

fn api_error(err: drive3::Error) -> Error {
    Error::Api(err.to_string())
}

fn remote_item(file: drive3::api::File) -> Result<RemoteItem> {
    let id = file
        .id
        .ok_or_else(|| Error::Api("item without id in response".to_string()))?;
    Ok(RemoteItem {
        name: file.name.unwrap_or_default(),
        mime_type: file.mime_type,
        size: file.size.and_then(|size| u64::try_from(size).ok()),
        id,
    })
}

#[async_trait]
impl DriveApi for HubClient {
    async fn get_item(&self, id: &str) -> Result<RemoteItem> {
        let (_, file) = self
            .hub
            .files()
            .get(id)
            .param("fields", ITEM_FIELDS)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(api_error)?;
        remote_item(file)
    }

    async fn list_children(&self, folder_id: &str, page_size: i32) -> Result<ChildPage> {
        let (_, list) = self
            .hub
            .files()
            .list()
            .q(&format!("'{}' in parents", folder_id))
            .page_size(page_size)
            .param("fields", CHILDREN_FIELDS)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(api_error)?;

        let items = list
            .files
            .unwrap_or_default()
            .into_iter()
            .map(remote_item)
            .collect::<Result<Vec<_>>>()?;
        debug!("Listed {} children of {}", items.len(), folder_id);

        Ok(ChildPage {
            items,
            has_more: list.next_page_token.is_some(),
        })
    }

    async fn list_permissions(&self, id: &str) -> Result<Vec<PermissionEntry>> {
        let (_, list) = self
            .hub
            .permissions()
            .list(id)
            .param("fields", PERMISSION_FIELDS)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(api_error)?;

        Ok(list
            .permissions
            .unwrap_or_default()
            .into_iter()
            .map(|permission| PermissionEntry {
                role: permission.role,
                email_address: permission.email_address,
                display_name: permission.display_name,
            })
            .collect())
    }

    async fn transfer_ownership(&self, id: &str, email: &str) -> Result<()> {
        let request = Permission {
            role: Some("owner".to_string()),
            type_: Some("user".to_string()),
            email_address: Some(email.to_string()),
            ..Default::default()
        };

        self.hub
            .permissions()
            .create(request, id)
            .transfer_ownership(true)
            .add_scope(Scope::Full)
            .doit()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
