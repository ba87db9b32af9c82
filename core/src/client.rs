//! Request builder, executor and response normalizer for the PetFriends API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and a `Transport`. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a shared `normalize` step that turns the transport's `HttpResponse`
//! into a `NormalizedResponse`. The public operations glue the two together
//! with exactly one `Transport::execute` call and never look at the status.

use std::path::Path;

use crate::error::ApiError;
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
use crate::types::{Credential, NormalizedResponse, PetForm, ResponseBody};

/// Public PetFriends endpoint.
pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru/";

const AUTH_HEADER: &str = "auth_key";
const PHOTO_FIELD: &str = "pet_photo";
const CREATE_ORDER: &[&str] = &["name", "animal_type", "age"];
const UPDATE_ORDER: &[&str] = &["name", "age", "animal_type"];

/// Synchronous client for the PetFriends API.
///
/// ```no_run
/// use petfriends_core::{BlockingTransport, PetFriendsClient};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PetFriendsClient::new(BlockingTransport::new()?);
/// let resp = client.get_api_key("user@example.com", "secret")?;
/// if let Some(cred) = resp.credential() {
///     let pets = client.get_list_of_pets(&cred, "my_pets")?;
///     println!("{} {:?}", pets.status, pets.body);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PetFriendsClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> PetFriendsClient<T> {
    /// Client for the public service at `DEFAULT_BASE_URL`.
    pub fn new(transport: T) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, transport)
    }

    pub fn with_base_url(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Request a session key. Credentials travel as headers, unvalidated.
    pub fn get_api_key(&self, email: &str, password: &str) -> Result<NormalizedResponse, ApiError> {
        self.send(self.build_get_api_key(email, password))
    }

    /// List pets. `filter` is passed through: `""` for all, `"my_pets"` for
    /// the caller's own.
    pub fn get_list_of_pets(
        &self,
        credential: &Credential,
        filter: &str,
    ) -> Result<NormalizedResponse, ApiError> {
        self.send(self.build_get_list_of_pets(credential, filter))
    }

    /// Create a pet with a photo read from `photo_path`.
    ///
    /// The photo is read before anything is sent; an unreadable file yields
    /// `ApiError::Photo` and the transport is not called.
    pub fn add_new_pet(
        &self,
        credential: &Credential,
        photo_path: impl AsRef<Path>,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> Result<NormalizedResponse, ApiError> {
        let form = PetForm::new(name, animal_type, age);
        let req = self.build_add_new_pet(credential, photo_path.as_ref(), &form)?;
        self.send(req)
    }

    /// Create a pet without a photo.
    pub fn create_pet_simple(
        &self,
        credential: &Credential,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> Result<NormalizedResponse, ApiError> {
        self.create_pet_simple_form(credential, &PetForm::new(name, animal_type, age))
    }

    /// Create a pet without a photo, leaving `None` fields out of the form.
    pub fn create_pet_simple_form(
        &self,
        credential: &Credential,
        form: &PetForm,
    ) -> Result<NormalizedResponse, ApiError> {
        self.send(self.build_create_pet_simple(credential, form))
    }

    pub fn update_pet_info(
        &self,
        credential: &Credential,
        pet_id: &str,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> Result<NormalizedResponse, ApiError> {
        self.update_pet_info_form(credential, pet_id, &PetForm::new(name, animal_type, age))
    }

    pub fn update_pet_info_form(
        &self,
        credential: &Credential,
        pet_id: &str,
        form: &PetForm,
    ) -> Result<NormalizedResponse, ApiError> {
        self.send(self.build_update_pet_info(credential, pet_id, form))
    }

    pub fn delete_pet(
        &self,
        credential: &Credential,
        pet_id: &str,
    ) -> Result<NormalizedResponse, ApiError> {
        self.send(self.build_delete_pet(credential, pet_id))
    }

    /// Attach a photo to an existing pet. Same file precondition as
    /// `add_new_pet`.
    pub fn add_photo_of_pet(
        &self,
        credential: &Credential,
        pet_id: &str,
        photo_path: impl AsRef<Path>,
    ) -> Result<NormalizedResponse, ApiError> {
        let req = self.build_add_photo_of_pet(credential, pet_id, photo_path.as_ref())?;
        self.send(req)
    }

    fn send(&self, request: HttpRequest) -> Result<NormalizedResponse, ApiError> {
        let response = self.transport.execute(request)?;
        Ok(normalize(response))
    }
}

impl<T> PetFriendsClient<T> {
    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_get_api_key(&self, email: &str, password: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url("api/key"),
            headers: vec![
                ("email".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
            ],
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn build_get_list_of_pets(&self, credential: &Credential, filter: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url("api/pets"),
            headers: auth_headers(credential),
            query: vec![("filter".to_string(), filter.to_string())],
            body: RequestBody::Empty,
        }
    }

    pub fn build_add_new_pet(
        &self,
        credential: &Credential,
        photo_path: &Path,
        form: &PetForm,
    ) -> Result<HttpRequest, ApiError> {
        let photo = read_photo(photo_path)?;
        let mut parts: Vec<FormPart> = form
            .fields(CREATE_ORDER)
            .into_iter()
            .map(|(k, v)| FormPart::text(k, v))
            .collect();
        parts.push(photo);
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url("api/pets"),
            headers: auth_headers(credential),
            query: Vec::new(),
            body: RequestBody::Multipart(parts),
        })
    }

    pub fn build_create_pet_simple(&self, credential: &Credential, form: &PetForm) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url("api/create_pet_simple"),
            headers: auth_headers(credential),
            query: Vec::new(),
            body: form_body(form, CREATE_ORDER),
        }
    }

    pub fn build_update_pet_info(
        &self,
        credential: &Credential,
        pet_id: &str,
        form: &PetForm,
    ) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            url: self.url(&format!("api/pets/{}", urlencoding::encode(pet_id))),
            headers: auth_headers(credential),
            query: Vec::new(),
            body: form_body(form, UPDATE_ORDER),
        }
    }

    pub fn build_delete_pet(&self, credential: &Credential, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url(&format!("api/pets/{}", urlencoding::encode(pet_id))),
            headers: auth_headers(credential),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn build_add_photo_of_pet(
        &self,
        credential: &Credential,
        pet_id: &str,
        photo_path: &Path,
    ) -> Result<HttpRequest, ApiError> {
        let photo = read_photo(photo_path)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(&format!("api/pets/set_photo/{}", urlencoding::encode(pet_id))),
            headers: auth_headers(credential),
            query: Vec::new(),
            body: RequestBody::Multipart(vec![photo]),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// Capture the status and parse the body as JSON, falling back to the raw
/// text. Never fails.
pub fn normalize(response: HttpResponse) -> NormalizedResponse {
    NormalizedResponse {
        status: response.status,
        body: ResponseBody::from_text(response.body),
    }
}

fn auth_headers(credential: &Credential) -> Vec<(String, String)> {
    vec![(AUTH_HEADER.to_string(), credential.key.clone())]
}

fn form_body(form: &PetForm, order: &[&'static str]) -> RequestBody {
    RequestBody::Form(
        form.fields(order)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Read the whole photo into memory. The file handle does not outlive this
/// call.
fn read_photo(path: &Path) -> Result<FormPart, ApiError> {
    let bytes = std::fs::read(path).map_err(|source| ApiError::Photo {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| PHOTO_FIELD.to_string());
    Ok(FormPart::File {
        name: PHOTO_FIELD.to_string(),
        content_type: content_type_for(path).to_string(),
        file_name,
        bytes,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        _ => "image/jpeg",
    }
}
