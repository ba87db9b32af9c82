//! In-process stand-in for the PetFriends service.
//!
//! Implements the seven endpoints the client talks to with an in-memory
//! store, so the client's test suite can run without the public service.

pub mod config;
pub mod error;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use config::{Account, ServerConfig};
pub use error::ServiceError;

/// A stored pet, serialized the way the service reports it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
    pub created_at: String,
}

/// Text fields of a create/update form. Missing fields stay `None`.
#[derive(Debug, Default, Deserialize)]
pub struct PetFields {
    pub name: Option<String>,
    pub animal_type: Option<String>,
    pub age: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: String,
}

#[derive(Debug, Default)]
pub struct Store {
    /// email -> (password, key)
    accounts: HashMap<String, (String, String)>,
    /// key -> email
    keys: HashMap<String, String>,
    /// Newest first.
    pets: Vec<Pet>,
}

impl Store {
    pub fn new(accounts: &[Account]) -> Self {
        let mut store = Store::default();
        for account in accounts {
            let key = Uuid::new_v4().simple().to_string();
            store.keys.insert(key.clone(), account.email.clone());
            store
                .accounts
                .insert(account.email.clone(), (account.password.clone(), key));
        }
        store
    }

    fn owner_of(&self, headers: &HeaderMap) -> Result<String, ServiceError> {
        let key = headers
            .get("auth_key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        self.keys.get(key).cloned().ok_or_else(|| {
            tracing::debug!("rejected auth_key");
            ServiceError::Forbidden
        })
    }

    fn own_pet_mut(&mut self, owner: &str, id: &str) -> Option<&mut Pet> {
        self.pets.iter_mut().find(|p| p.id == id && p.user_id == owner)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app(config: &ServerConfig) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(&config.accounts)));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/{id}", put(update_pet).delete(delete_pet))
        .route("/api/pets/set_photo/{id}", post(set_photo))
        .with_state(db)
}

pub async fn run(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(&config)).await
}

async fn get_api_key(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let (email, password) = (header("email"), header("password"));
    let store = db.read().await;
    match store.accounts.get(&email) {
        Some((expected, key)) if *expected == password => Ok(Json(json!({ "key": key }))),
        _ => {
            tracing::debug!(%email, "rejected credentials");
            Err(ServiceError::Forbidden)
        }
    }
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ServiceError> {
    let store = db.read().await;
    let owner = store.owner_of(&headers)?;
    let pets: Vec<&Pet> = match query.filter.as_str() {
        "" => store.pets.iter().collect(),
        "my_pets" => store.pets.iter().filter(|p| p.user_id == owner).collect(),
        other => {
            return Err(ServiceError::BadRequest(format!(
                "Filter value is incorrect: {other}"
            )))
        }
    };
    Ok(Json(json!({ "pets": pets })))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(fields): Form<PetFields>,
) -> Result<Json<Pet>, ServiceError> {
    let mut store = db.write().await;
    let owner = store.owner_of(&headers)?;
    let pet = new_pet(&owner, fields, String::new())?;
    tracing::info!(id = %pet.id, "pet created");
    store.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn create_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, ServiceError> {
    let owner = db.read().await.owner_of(&headers)?;
    let upload = read_upload(multipart).await?;
    let photo = upload
        .photo
        .ok_or_else(|| ServiceError::BadRequest("pet_photo is required".into()))?;
    let pet = new_pet(&owner, upload.fields, photo_data_uri(&photo)?)?;

    tracing::info!(id = %pet.id, "pet created with photo");
    db.write().await.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(fields): Form<PetFields>,
) -> Result<Json<Pet>, ServiceError> {
    let mut store = db.write().await;
    let owner = store.owner_of(&headers)?;
    let pet = store
        .own_pet_mut(&owner, &id)
        .ok_or_else(|| ServiceError::BadRequest(format!("Pet {id} not found")))?;

    // Validate everything before touching the record.
    let name = fields.name.map(|n| non_empty("name", Some(n))).transpose()?;
    let animal_type = fields
        .animal_type
        .map(|t| non_empty("animal_type", Some(t)))
        .transpose()?;
    let age = fields.age.map(|a| valid_age(Some(a))).transpose()?;

    if let Some(name) = name {
        pet.name = name;
    }
    if let Some(animal_type) = animal_type {
        pet.animal_type = animal_type;
    }
    if let Some(age) = age {
        pet.age = age;
    }
    Ok(Json(pet.clone()))
}

async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<String, ServiceError> {
    let mut store = db.write().await;
    let owner = store.owner_of(&headers)?;
    let index = store
        .pets
        .iter()
        .position(|p| p.id == id && p.user_id == owner)
        .ok_or_else(|| ServiceError::NotFound(format!("Pet {id} not found")))?;
    store.pets.remove(index);
    tracing::info!(%id, "pet deleted");
    Ok(String::new())
}

async fn set_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, ServiceError> {
    let owner = db.read().await.owner_of(&headers)?;
    let upload = read_upload(multipart).await?;
    let photo = upload
        .photo
        .ok_or_else(|| ServiceError::BadRequest("pet_photo is required".into()))?;
    let data_uri = photo_data_uri(&photo)?;

    let mut store = db.write().await;
    let pet = store
        .own_pet_mut(&owner, &id)
        .ok_or_else(|| ServiceError::BadRequest(format!("Pet {id} not found")))?;
    pet.pet_photo = data_uri;
    Ok(Json(pet.clone()))
}

struct Upload {
    fields: PetFields,
    photo: Option<Vec<u8>>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ServiceError> {
    let mut upload = Upload {
        fields: PetFields::default(),
        photo: None,
    };
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => upload.fields.name = Some(field.text().await?),
            "animal_type" => upload.fields.animal_type = Some(field.text().await?),
            "age" => upload.fields.age = Some(field.text().await?),
            "pet_photo" => upload.photo = Some(field.bytes().await?.to_vec()),
            _ => {}
        }
    }
    Ok(upload)
}

fn new_pet(owner: &str, fields: PetFields, pet_photo: String) -> Result<Pet, ServiceError> {
    Ok(Pet {
        id: Uuid::new_v4().to_string(),
        name: non_empty("name", fields.name)?,
        animal_type: non_empty("animal_type", fields.animal_type)?,
        age: valid_age(fields.age)?,
        pet_photo,
        user_id: owner.to_string(),
        created_at: now_secs(),
    })
}

fn non_empty(field: &str, value: Option<String>) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::BadRequest(format!("{field} must be a non-empty string"))),
    }
}

/// Age is stored as text but must read as a non-negative integer.
fn valid_age(value: Option<String>) -> Result<String, ServiceError> {
    match value {
        Some(v) if v.trim().parse::<u32>().is_ok() => Ok(v),
        _ => Err(ServiceError::BadRequest("age must be a number".into())),
    }
}

/// Recognize an image by its leading bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

fn photo_data_uri(bytes: &[u8]) -> Result<String, ServiceError> {
    let mime = sniff_image(bytes)
        .ok_or_else(|| ServiceError::BadRequest("pet_photo is not an image".into()))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn now_secs() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
        .to_string()
}
