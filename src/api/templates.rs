use serde_json::json;
use tracing::debug;
use tracker_domain::{Template, TemplateTestResult};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub fn list_templates(&self) -> Result<Vec<Template>, ApiError> {
        self.get_json("/templates/", &[])
    }

    pub fn get_template(&self, id: i64) -> Result<Template, ApiError> {
        self.get_json(&format!("/templates/{}", id), &[])
    }

    pub fn create_template(&self, template: &Template) -> Result<Template, ApiError> {
        self.post_json("/templates/", template)
    }

    pub fn update_template(&self, id: i64, template: &Template) -> Result<Template, ApiError> {
        self.put_json(&format!("/templates/{}", id), template)
    }

    pub fn delete_template(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/templates/{}", id)).map(|_| ())
    }

    /// Runs a stored template against an already uploaded invoice.
    pub fn test_template(
        &self,
        template_id: i64,
        invoice_id: i64,
    ) -> Result<TemplateTestResult, ApiError> {
        let result: TemplateTestResult = self.post_json(
            "/templates/test",
            &json!({ "template_id": template_id, "invoice_id": invoice_id }),
        )?;
        debug!(
            template_id,
            invoice_id,
            score = result.match_score,
            "template test finished"
        );
        Ok(result)
    }
}
