//! Browser-style session against the target's web UI, for the one
//! operation the web service has no endpoint for: creating release-group
//! collections.

use super::WEB_BASE;
use anyhow::{anyhow, bail, Result};
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::debug;

pub struct WebSession {
    client: reqwest::Client,
    username: String,
    password: String,
}

impl WebSession {
    pub fn new(user_agent: &str, username: &str, password: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Log in by replaying the web form with its csrf hidden fields.
    async fn login(&self) -> Result<()> {
        let login_url = format!("{}/login", WEB_BASE);
        let page = self
            .client
            .get(&login_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let (csrf_session_key, csrf_token) = csrf_fields(&page)?;

        let form = [
            ("csrf_session_key", csrf_session_key.as_str()),
            ("csrf_token", csrf_token.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("remember_me", "1"),
        ];
        self.client
            .post(&login_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        debug!(username = %self.username, "Web session established");
        Ok(())
    }

    /// Create a collection through the web form. `collection_type` names an
    /// entry of the form's type dropdown, e.g. "release group collection".
    pub async fn create_collection(&self, name: &str, collection_type: &str) -> Result<()> {
        self.login().await?;

        let create_url = format!("{}/collection/create", WEB_BASE);
        let page = self
            .client
            .get(&create_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let types = collection_types(&page)?;
        let type_id = types.get(&collection_type.to_lowercase()).ok_or_else(|| {
            anyhow!("Create form offers no {:?} collection type", collection_type)
        })?;

        let form = [
            ("edit-list.name", name),
            ("edit-list.type_id", type_id.as_str()),
            ("edit-list.description", ""),
        ];
        self.client
            .post(&create_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        debug!(name, collection_type, "Created collection via web form");
        Ok(())
    }
}

/// Hidden csrf inputs on a web form.
fn csrf_fields(html: &str) -> Result<(String, String)> {
    let document = Html::parse_document(html);
    let field = |name: &str| -> Result<String> {
        let selector = Selector::parse(&format!(r#"input[name="{}"]"#, name))
            .map_err(|e| anyhow!("bad selector: {:?}", e))?;
        document
            .select(&selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(|value| value.to_string())
            .ok_or_else(|| anyhow!("Form has no {} field", name))
    };
    Ok((field("csrf_session_key")?, field("csrf_token")?))
}

/// Map of collection-type names to dropdown values. Child options are
/// indented with a no-break space and scoped under the preceding parent
/// option, so "release group collection" under "Collection" becomes
/// "collection - release group collection" as well as its bare name.
fn collection_types(html: &str) -> Result<HashMap<String, String>> {
    let document = Html::parse_document(html);
    let option_selector =
        Selector::parse(r#"select[id="id-edit-list.type_id"] option"#).unwrap();

    let mut types = HashMap::new();
    let mut last_parent: Option<String> = None;
    for option in document.select(&option_selector) {
        let value = match option.value().attr("value") {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => continue,
        };
        let text: String = option.text().collect();
        if let Some(child) = text.strip_prefix('\u{a0}') {
            let child = child.trim();
            types.insert(child.to_lowercase(), value.clone());
            if let Some(parent) = &last_parent {
                types.insert(format!("{} - {}", parent.to_lowercase(), child.to_lowercase()), value);
            }
        } else {
            let parent = text.trim().to_string();
            types.insert(parent.to_lowercase(), value);
            last_parent = Some(parent);
        }
    }

    if types.is_empty() {
        bail!("Create form has no collection-type dropdown");
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_fields_come_from_hidden_inputs() {
        let html = r#"
            <form>
              <input name="csrf_session_key" type="hidden" value="sess-1"/>
              <input name="csrf_token" type="hidden" value="tok-2"/>
            </form>
        "#;
        let (key, token) = csrf_fields(html).unwrap();
        assert_eq!(key, "sess-1");
        assert_eq!(token, "tok-2");
    }

    #[test]
    fn missing_csrf_token_is_an_error() {
        let html = r#"<input name="csrf_session_key" value="sess-1"/>"#;
        assert!(csrf_fields(html).is_err());
    }

    #[test]
    fn dropdown_children_scope_under_parents() {
        let html = "
            <select id=\"id-edit-list.type_id\">
              <option value=\"\">-</option>
              <option value=\"1\">Collection</option>
              <option value=\"2\">\u{a0}Release group collection</option>
              <option value=\"3\">\u{a0}Release collection</option>
            </select>
        ";
        let types = collection_types(html).unwrap();
        assert_eq!(types.get("release group collection"), Some(&"2".to_string()));
        assert_eq!(
            types.get("collection - release collection"),
            Some(&"3".to_string())
        );
        assert_eq!(types.get("collection"), Some(&"1".to_string()));
    }

    #[test]
    fn page_without_dropdown_is_an_error() {
        assert!(collection_types("<html><body></body></html>").is_err());
    }
}
