use std::{
    fmt,
    str::FromStr,
};
use crate::error::ValueError;
use super::*;

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            fieldset: false,
            options: ActionStyle::Radios,
            schedule_enable: true,
            comment_required: false,
            always_update_entity: false,
            watchdog_log: true,
        }
    }
}

impl Workflow {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            settings: WorkflowSettings::default(),
        }
    }

    pub fn settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl fmt::Display for ActionStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ActionStyle::Radios => "radios",
            ActionStyle::Buttons => "buttons",
            ActionStyle::Dropbutton => "dropbutton",
            ActionStyle::Select => "select",
        })
    }
}

impl FromStr for ActionStyle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "radios" => Ok(ActionStyle::Radios),
            "buttons" => Ok(ActionStyle::Buttons),
            "dropbutton" => Ok(ActionStyle::Dropbutton),
            "select" => Ok(ActionStyle::Select),
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::*;

    #[test]
    fn settings_defaults() -> anyhow::Result<()> {
        // missing keys fall back to the defaults
        let settings: WorkflowSettings = serde_json::from_str(r#"{
            "options": "buttons",
            "always_update_entity": true
        }"#)?;
        assert_eq!(settings, WorkflowSettings {
            options: ActionStyle::Buttons,
            always_update_entity: true,
            .. Default::default()
        });
        assert!(settings.schedule_enable);
        assert!(settings.watchdog_log);

        let workflow: Workflow = serde_json::from_str(r#"{
            "id": "editorial",
            "label": "Editorial"
        }"#)?;
        assert_eq!(workflow, Workflow::new("editorial", "Editorial"));
        Ok(())
    }

    #[test]
    fn action_style() -> anyhow::Result<()> {
        assert_eq!(ActionStyle::Dropbutton.to_string(), "dropbutton");
        assert_eq!(ActionStyle::from_str("Select")?, ActionStyle::Select);
        assert!(matches!(
            ActionStyle::from_str("checkboxes")
                .expect_err("should be an error"),
            ValueError::Unsupported(s) if s == "checkboxes",
        ));
        Ok(())
    }
}
