//! Read-only remote model over the configured organization directory.
//!
//! Lets a bare gateway expose `Organization` queries (including the `"this"`
//! sentinel) without an application supplying its own models.

use {
    async_trait::async_trait,
    remoql_config::OrganizationEntry,
    remoql_model::{
        CallRequest, MethodDescriptor, ModelError, ModelResult, OrgId, ParamSpec, RemoteModel,
        ValueType, Verb,
    },
    serde_json::{Value, json},
};

pub struct DirectoryModel {
    name: String,
    methods: Vec<MethodDescriptor>,
    organizations: Vec<OrganizationEntry>,
}

impl DirectoryModel {
    pub fn new(name: impl Into<String>, organizations: Vec<OrganizationEntry>) -> Self {
        let methods = vec![
            MethodDescriptor::new("find", Verb::Get)
                .static_method()
                .description("Find all organizations visible to the caller.")
                .accepts(ParamSpec::new("filter", ValueType::Json))
                .accepts(ParamSpec::new("options", ValueType::Json))
                .returns_list(ValueType::Json),
            MethodDescriptor::new("findById", Verb::Get)
                .static_method()
                .description("Find an organization by id.")
                .accepts(ParamSpec::new("id", ValueType::Id).required())
                .accepts(ParamSpec::new("filter", ValueType::Json))
                .accepts(ParamSpec::new("options", ValueType::Json))
                .returns(ValueType::Json),
            MethodDescriptor::new("exists", Verb::Get)
                .static_method()
                .description("Check whether an organization exists.")
                .accepts(ParamSpec::new("id", ValueType::Id).required())
                .returns(ValueType::Boolean),
        ];
        Self {
            name: name.into(),
            methods,
            organizations,
        }
    }

    fn lookup(&self, id: &Value) -> Option<&OrganizationEntry> {
        let id = id_string(id)?;
        self.organizations.iter().find(|org| org.id == id)
    }

    fn render(org: &OrganizationEntry) -> Value {
        json!({
            "id": OrgId::new(org.id.as_str()).to_value(),
            "domains": org.domains,
        })
    }
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl RemoteModel for DirectoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    async fn invoke(&self, method: &str, params: Vec<Value>, _request: &CallRequest) -> ModelResult {
        match method {
            "find" => {
                // Scoped calls only see their own organization.
                let scope = params
                    .last()
                    .and_then(|options| options.get("orgId"))
                    .and_then(id_string);
                Ok(Value::Array(
                    self.organizations
                        .iter()
                        .filter(|org| scope.as_deref().is_none_or(|id| org.id == id))
                        .map(Self::render)
                        .collect(),
                ))
            },
            "findById" => {
                let id = params.first().cloned().unwrap_or(Value::Null);
                self.lookup(&id).map(Self::render).ok_or_else(|| {
                    ModelError::new(format!("Unknown \"{}\" id {id}.", self.name))
                        .with_code("MODEL_NOT_FOUND")
                })
            },
            "exists" => Ok(Value::Bool(
                params.first().and_then(|id| self.lookup(id)).is_some(),
            )),
            other => Err(ModelError::new(format!(
                "{} has no remote method {other}",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn model() -> DirectoryModel {
        DirectoryModel::new("Organization", vec![
            OrganizationEntry {
                id: "42".into(),
                domains: vec!["hq.example.com".into()],
            },
            OrganizationEntry {
                id: "acme".into(),
                domains: Vec::new(),
            },
        ])
    }

    #[tokio::test]
    async fn find_respects_scope() {
        let m = model();
        let req = CallRequest::default();
        let all = m.invoke("find", vec![json!({}), json!({})], &req).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), 2);

        let scoped = m
            .invoke("find", vec![json!({}), json!({ "orgId": 42 })], &req)
            .await
            .unwrap();
        assert_eq!(scoped, json!([{ "id": 42, "domains": ["hq.example.com"] }]));
    }

    #[tokio::test]
    async fn find_by_id_reports_unknown_ids() {
        let m = model();
        let req = CallRequest::default();
        let found = m.invoke("findById", vec![json!("acme")], &req).await.unwrap();
        assert_eq!(found["id"], "acme");

        let err = m.invoke("findById", vec![json!(7)], &req).await.unwrap_err();
        assert_eq!(err.message, "Unknown \"Organization\" id 7.");
        assert_eq!(err.code.as_deref(), Some("MODEL_NOT_FOUND"));
    }

    #[tokio::test]
    async fn exists_and_unknown_methods() {
        let m = model();
        let req = CallRequest::default();
        assert_eq!(m.invoke("exists", vec![json!(42)], &req).await.unwrap(), json!(true));
        assert_eq!(m.invoke("exists", vec![json!("x")], &req).await.unwrap(), json!(false));
        assert!(m.invoke("destroyAll", Vec::new(), &req).await.is_err());
    }
}
