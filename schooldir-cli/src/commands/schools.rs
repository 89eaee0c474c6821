//! Directory client commands - talk to a running schooldir server over HTTP
//!
//! Commands: list, add, edit, delete, upload
//!
//! ```bash
//! schooldir list --search lincoln --state IL
//! schooldir add --name "Lincoln High" --city Springfield --state IL --image front.jpg
//! schooldir list --json | jq '.[] | {id, name}'
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use schooldir_server::http::routes::schools::{CreatedResponse, MessageResponse};
use schooldir_server::http::routes::upload::{UploadResponse, IMAGE_FIELD};
use schooldir_server::media::MAX_IMAGE_BYTES;
use schooldir_server::models::School;
use schooldir_server::view::{distinct_states, ViewFilter};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";

// ============================================================================
// Args
// ============================================================================

/// Where the API lives (shared by all client commands)
#[derive(Parser, Debug, Clone)]
pub struct EndpointArgs {
    /// schooldir API endpoint
    #[arg(long, env = "SCHOOLDIR_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl EndpointArgs {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Match name or city (case-insensitive substring)
    #[arg(long, short, default_value = "")]
    pub search: String,

    /// Only schools in this state (exact match)
    #[arg(long, default_value = "")]
    pub state: String,

    /// Print the filtered rows as JSON
    #[arg(long)]
    pub json: bool,
}

/// Record fields shared by add and edit
#[derive(Parser, Debug)]
pub struct SchoolFields {
    /// School name
    #[arg(long)]
    pub name: String,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// City
    #[arg(long)]
    pub city: String,

    /// State
    #[arg(long)]
    pub state: String,

    /// Contact number (10 digits)
    #[arg(long)]
    pub contact_number: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Image file to upload and attach
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(flatten)]
    pub fields: SchoolFields,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// School id
    pub id: i32,

    #[command(flatten)]
    pub fields: SchoolFields,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// School id
    pub id: i32,
}

#[derive(Parser, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Image file
    pub file: PathBuf,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize, Debug)]
struct SchoolBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    name: &'a str,
    address: Option<&'a str>,
    city: &'a str,
    state: &'a str,
    contact_number: Option<&'a str>,
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl<'a> SchoolBody<'a> {
    fn new(id: Option<i32>, fields: &'a SchoolFields, image: Option<String>) -> Self {
        Self {
            id,
            name: &fields.name,
            address: fields.address.as_deref(),
            city: &fields.city,
            state: &fields.state,
            contact_number: fields.contact_number.as_deref(),
            email: fields.email.as_deref(),
            image,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// HTTP Client Helpers
// ============================================================================

async fn handle_response<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response.json::<T>().await.context("Failed to parse response")
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&error_text) {
            Err(anyhow!("{}: {}", status, error_resp.error))
        } else {
            Err(anyhow!("{}: {}", status, error_text))
        }
    }
}

/// Mirror the server's checks so obviously bad files never leave the machine.
fn image_mime(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        _ => bail!("{} is not an image file", path.display()),
    }
}

async fn upload_file(client: &Client, endpoint: &EndpointArgs, path: &Path) -> Result<UploadResponse> {
    let mime = image_mime(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.len() > MAX_IMAGE_BYTES {
        bail!(
            "{} is larger than {} MB",
            path.display(),
            MAX_IMAGE_BYTES / (1024 * 1024)
        );
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let part = Part::bytes(bytes).file_name(file_name).mime_str(mime)?;
    let form = Form::new().part(IMAGE_FIELD, part);

    let response = client
        .post(endpoint.url("/upload"))
        .multipart(form)
        .send()
        .await
        .context("Failed to connect to schooldir API")?;

    handle_response(response).await
}

async fn fetch_schools(client: &Client, endpoint: &EndpointArgs) -> Result<Vec<School>> {
    let response = client
        .get(endpoint.url("/schools"))
        .send()
        .await
        .context("Failed to connect to schooldir API")?;
    handle_response(response).await
}

fn display_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().unwrap_or(fallback)
}

// ============================================================================
// Commands
// ============================================================================

pub async fn run_list(args: ListArgs) -> Result<()> {
    let client = Client::new();
    let schools = fetch_schools(&client, &args.endpoint).await?;

    let filter = ViewFilter::new(args.search, args.state);
    let shown = filter.apply(&schools);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!(
        "Displaying {} of {} schools ({} states)",
        shown.len(),
        schools.len(),
        distinct_states(&schools).len()
    );

    if shown.is_empty() {
        println!("No schools match. Adjust your search or state filter.");
        return Ok(());
    }

    for school in shown {
        println!(
            "#{:<5} {}  -  {}, {}",
            school.id,
            school.name,
            display_or(&school.city, "Unknown"),
            display_or(&school.state, "Unknown"),
        );
        if let Some(address) = &school.address {
            println!("       {}", address);
        }
        let contact: Vec<&str> = [school.contact_number.as_deref(), school.email.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !contact.is_empty() {
            println!("       {}", contact.join("  |  "));
        }
        if let Some(image) = &school.image {
            println!("       {}", image);
        }
    }

    Ok(())
}

pub async fn run_add(args: AddArgs) -> Result<()> {
    let client = Client::new();

    let image = match &args.fields.image {
        Some(path) => Some(upload_file(&client, &args.endpoint, path).await?.path),
        None => None,
    };

    let response = client
        .post(args.endpoint.url("/schools"))
        .json(&SchoolBody::new(None, &args.fields, image))
        .send()
        .await
        .context("Failed to connect to schooldir API")?;

    let created: CreatedResponse = handle_response(response).await?;
    println!("{} (id {})", created.message, created.id);
    Ok(())
}

pub async fn run_edit(args: EditArgs) -> Result<()> {
    let client = Client::new();

    let image = match &args.fields.image {
        Some(path) => Some(upload_file(&client, &args.endpoint, path).await?.path),
        None => None,
    };

    let response = client
        .put(args.endpoint.url("/schools"))
        .json(&SchoolBody::new(Some(args.id), &args.fields, image))
        .send()
        .await
        .context("Failed to connect to schooldir API")?;

    let updated: MessageResponse = handle_response(response).await?;
    println!("{}", updated.message);
    Ok(())
}

pub async fn run_delete(args: DeleteArgs) -> Result<()> {
    let client = Client::new();

    let response = client
        .delete(args.endpoint.url("/schools"))
        .query(&[("id", args.id)])
        .send()
        .await
        .context("Failed to connect to schooldir API")?;

    let deleted: MessageResponse = handle_response(response).await?;
    println!("{}", deleted.message);
    Ok(())
}

pub async fn run_upload(args: UploadArgs) -> Result<()> {
    let client = Client::new();
    let uploaded = upload_file(&client, &args.endpoint, &args.file).await?;
    println!("{}", uploaded.path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let endpoint = EndpointArgs {
            endpoint: "http://localhost:3000/".into(),
        };
        assert_eq!(endpoint.url("/schools"), "http://localhost:3000/schools");
    }

    #[test]
    fn image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("a.PNG")).unwrap(), "image/png");
        assert_eq!(image_mime(Path::new("a.jpeg")).unwrap(), "image/jpeg");
        assert!(image_mime(Path::new("notes.txt")).is_err());
        assert!(image_mime(Path::new("noext")).is_err());
    }

    #[test]
    fn body_omits_id_and_image_when_absent() {
        let fields = SchoolFields {
            name: "Lincoln High".into(),
            address: None,
            city: "Springfield".into(),
            state: "IL".into(),
            contact_number: Some("5551234567".into()),
            email: None,
            image: None,
        };
        let value = serde_json::to_value(SchoolBody::new(None, &fields, None)).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("image").is_none());
        assert_eq!(value["name"], "Lincoln High");
        assert_eq!(value["contact_number"], "5551234567");

        let value =
            serde_json::to_value(SchoolBody::new(Some(4), &fields, Some("https://x/y.png".into())))
                .unwrap();
        assert_eq!(value["id"], 4);
        assert_eq!(value["image"], "https://x/y.png");
    }
}
