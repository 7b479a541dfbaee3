use serde::{Deserialize, Serialize};

/// One snapshot of a profile page. Optional fields serialize as `null`, never omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub profile_id: Option<String>,
    pub timestamp: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub connections: Option<String>,
    #[serde(default)]
    pub current_position: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ExperienceEntry {
    /// Entries without a title or a company are noise from the item list.
    pub fn is_meaningful(&self) -> bool {
        non_empty(&self.title) || non_empty(&self.company)
    }

    pub fn is_ongoing(&self) -> bool {
        self.duration.as_deref().is_some_and(|d| {
            let lower = d.to_lowercase();
            lower.contains("present") || lower.contains("current")
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub endorsements: Option<String>,
}

impl ProfileRecord {
    /// Only the first experience entry is consulted, and only when its duration reads as ongoing.
    pub fn derive_current_role(&mut self) {
        if let Some(first) = self.experience.first() {
            if first.is_ongoing() {
                self.current_position = first.title.clone();
                self.current_company = first.company.clone();
            }
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

fn non_empty(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// `https://www.linkedin.com/in/jane-doe/details` → `jane-doe`
pub fn profile_id_from_url(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    let rest = path.split("/in/").nth(1)?;
    let id = rest.split('/').next().unwrap_or_default();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_id_from_profile_url() {
        assert_eq!(
            profile_id_from_url("https://www.linkedin.com/in/jane-doe/").as_deref(),
            Some("jane-doe")
        );
        assert_eq!(
            profile_id_from_url("https://www.linkedin.com/in/jane-doe/details/skills/?x=1").as_deref(),
            Some("jane-doe")
        );
    }

    #[test]
    fn profile_id_absent_outside_profiles() {
        assert_eq!(profile_id_from_url("https://www.linkedin.com/feed/"), None);
        assert_eq!(profile_id_from_url("https://www.linkedin.com/in/"), None);
    }

    #[test]
    fn optional_fields_serialize_as_null() {
        let record = ProfileRecord {
            url: "https://www.linkedin.com/in/x/".into(),
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "profileId",
            "name",
            "headline",
            "location",
            "about",
            "profilePicture",
            "connections",
            "currentPosition",
            "currentCompany",
        ] {
            assert!(json.get(key).is_some_and(|v| v.is_null()), "missing null key {key}");
        }
        assert!(json["experience"].as_array().unwrap().is_empty());
    }

    #[test]
    fn current_role_only_from_ongoing_first_entry() {
        let mut record = ProfileRecord {
            experience: vec![
                ExperienceEntry {
                    title: Some("Engineer".into()),
                    company: Some("Old Co".into()),
                    duration: Some("2015 - 2018".into()),
                    ..Default::default()
                },
                ExperienceEntry {
                    title: Some("Lead".into()),
                    company: Some("Now Co".into()),
                    duration: Some("Jan 2019 - Present".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        record.derive_current_role();
        assert_eq!(record.current_position, None);
        assert_eq!(record.current_company, None);

        record.experience.swap(0, 1);
        record.derive_current_role();
        assert_eq!(record.current_position.as_deref(), Some("Lead"));
        assert_eq!(record.current_company.as_deref(), Some("Now Co"));
    }

    #[test]
    fn tolerates_missing_optional_keys_on_read() {
        let json = r#"{"timestamp":"t","url":"u","profileId":"p"}"#;
        let record: ProfileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.profile_id.as_deref(), Some("p"));
        assert!(record.skills.is_empty());
    }
}
