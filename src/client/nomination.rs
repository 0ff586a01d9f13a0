// The form to nominate a company.

use log::{debug, info, warn};
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::client::routes::Navigator;
use crate::client::server_request::*;
use crate::client::*;

pub const MAX_FOUNDERS: usize = 3;

/// Only the first founder is asked for at first.
const HIDDEN_FIELDS: [&str; 4] = ["founder2_name", "founder2_desc", "founder3_name", "founder3_desc"];

/// One field of the form, as described by the server.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: String,
    #[serde(rename = "helpText")]
    pub help_text: String,
    #[serde(skip)]
    pub visible: bool,
}

#[derive(Deserialize)]
struct FormMetadata {
    #[serde(default)]
    form_metadata: Vec<FormField>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default, deserialize_with = "read_optional_biv_id")]
    nominee_biv_id: Option<String>,
    errors: Option<BTreeMap<String, String>>,
}

fn read_optional_biv_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "read_biv_id")] String);
    let w: Option<Wrapper> = Option::deserialize(deserializer)?;
    Ok(w.map(|Wrapper(s)| s))
}

pub struct NominationForm {
    server: ServerRequest,
    pub fields: Vec<FormField>,
    pub data: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
    founder_count: usize,
    /// A submission is in flight.
    pub saving: bool,
}

impl NominationForm {
    pub fn load(server: &ServerRequest) -> ClientResult<NominationForm> {
        let meta: FormMetadata = server.send_empty(NOMINEE_FORM_METADATA)?;
        let fields: Vec<FormField> = meta
            .form_metadata
            .into_iter()
            .map(|mut f| {
                f.visible = !HIDDEN_FIELDS.contains(&f.name.as_str());
                f
            })
            .collect();
        debug!("NominationForm::load: {} fields", fields.len());
        Ok(NominationForm {
            server: server.clone(),
            fields,
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
            founder_count: 1,
            saving: false,
        })
    }

    pub fn founder_count(&self) -> usize {
        self.founder_count
    }

    /// Shows the fields of one more founder.
    pub fn add_founder(&mut self) {
        if self.founder_count >= MAX_FOUNDERS {
            return;
        }
        self.founder_count += 1;
        let prefix = format!("founder{}", self.founder_count);
        for f in self.fields.iter_mut().filter(|f| f.name.contains(&prefix)) {
            f.visible = true;
        }
    }

    pub fn show_add_founder(&self) -> bool {
        self.founder_count < MAX_FOUNDERS
    }

    pub fn visible_fields(&self) -> Vec<&FormField> {
        self.fields.iter().filter(|f| f.visible).collect()
    }

    pub fn set_value(&mut self, name: &str, value: &str) -> ClientResult<()> {
        if !self.fields.iter().any(|f| f.name == name) {
            whatever!("unknown form field: {}", name);
        }
        self.data.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn get_error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(|s| s.as_str())
    }

    pub fn has_error(&self, name: &str) -> bool {
        self.get_error(name).is_some()
    }

    pub fn allow_nominations(&self, nav: &mut Navigator) -> ClientResult<bool> {
        Ok(nav.context(&self.server)?.contest.allow_nominations())
    }

    /// Submits the form. Field errors sent back by the server are kept on the
    /// form; a valid nomination leads to the thank you page.
    pub fn save_form(&mut self, nav: &mut Navigator) -> ClientResult<()> {
        self.saving = true;
        let body = encode_body(NOMINEE_FORM_SUBMIT, &self.data)?;
        let res: ClientResult<SubmitResponse> = self.server.send_request(NOMINEE_FORM_SUBMIT, &body);
        self.saving = false;
        match res {
            Ok(SubmitResponse {
                errors: Some(errors),
                ..
            }) => {
                debug!("save_form: rejected fields: {:?}", errors.keys());
                self.errors = errors;
                Ok(())
            }
            Ok(SubmitResponse {
                nominee_biv_id: Some(biv_id),
                ..
            }) => {
                info!("save_form: nominated {}", biv_id);
                self.errors.clear();
                nav.navigate(&format!("/{}/nominate-thank-you", biv_id));
                Ok(())
            }
            Ok(_) => whatever!("the nomination was neither accepted nor rejected"),
            Err(e) if e.status() == Some(403) => {
                warn!("save_form: not logged in");
                self.errors.insert(
                    "display_name".to_string(),
                    "Log in to nominate a company".to_string(),
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
