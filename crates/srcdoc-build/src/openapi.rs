//! OpenAPI 3 conversion
//!
//! A lossy projection of the document tree onto OpenAPI 3: routes
//! group into path items, parameters split by location, request and
//! response bodies keep their schemas per mimetype. Position data does
//! not survive the trip; this output exists for interoperability.

use serde_json::{json, Map, Value};
use srcdoc_ast::{Api, ApiDoc, Param, Request, Richtext, TypeValue};

fn text_of(rt: &Option<Richtext>) -> Option<String> {
    rt.as_ref().map(|r| r.text().to_string()).filter(|s| !s.is_empty())
}

fn raw_of(attr: &Option<srcdoc_ast::StringAttribute>) -> Option<String> {
    attr.as_ref().map(|a| a.raw().to_string()).filter(|s| !s.is_empty())
}

/// Convert a merged document to an OpenAPI 3 value
pub fn convert(doc: &ApiDoc) -> Value {
    let mut info = Map::new();
    info.insert(
        "title".into(),
        doc.title.as_ref().map(|t| t.text()).unwrap_or("srcdoc").into(),
    );
    info.insert(
        "version".into(),
        doc.version.as_ref().map(|v| v.raw().to_string()).unwrap_or_else(|| "0.1.0".into()).into(),
    );
    if let Some(desc) = text_of(&doc.description) {
        info.insert("description".into(), desc.into());
    }
    if let Some(contact) = &doc.contact {
        let mut c = Map::new();
        if let Some(name) = raw_of(&contact.name) {
            c.insert("name".into(), name.into());
        }
        if let Some(url) = &contact.url {
            c.insert("url".into(), url.text().into());
        }
        if let Some(email) = &contact.email {
            c.insert("email".into(), email.text().into());
        }
        info.insert("contact".into(), c.into());
    }
    if let Some(license) = &doc.license {
        let mut l = Map::new();
        if let Some(text) = raw_of(&license.text) {
            l.insert("name".into(), text.into());
        }
        if let Some(url) = raw_of(&license.url) {
            l.insert("url".into(), url.into());
        }
        info.insert("license".into(), l.into());
    }

    let servers: Vec<Value> = doc
        .servers
        .iter()
        .map(|s| {
            let mut v = Map::new();
            if let Some(url) = raw_of(&s.url) {
                v.insert("url".into(), url.into());
            }
            if let Some(summary) = raw_of(&s.summary) {
                v.insert("description".into(), summary.into());
            }
            v.into()
        })
        .collect();

    let tags: Vec<Value> = doc
        .tags
        .iter()
        .map(|t| {
            let mut v = Map::new();
            if let Some(name) = raw_of(&t.name) {
                v.insert("name".into(), name.into());
            }
            if let Some(title) = raw_of(&t.title) {
                v.insert("description".into(), title.into());
            }
            v.into()
        })
        .collect();

    let mut paths = Map::new();
    for api in &doc.apis {
        let Some(route) = api.path.as_ref().and_then(|p| p.path.as_ref()) else {
            continue;
        };
        let Some(method) = api.method.as_ref() else {
            continue;
        };
        let item = paths
            .entry(route.raw().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(item) = item {
            item.insert(method.method().to_ascii_lowercase(), operation_of(api));
        }
    }

    let mut root = Map::new();
    root.insert("openapi".into(), "3.0.3".into());
    root.insert("info".into(), info.into());
    if !servers.is_empty() {
        root.insert("servers".into(), servers.into());
    }
    if !tags.is_empty() {
        root.insert("tags".into(), tags.into());
    }
    root.insert("paths".into(), paths.into());
    root.into()
}

fn operation_of(api: &Api) -> Value {
    let mut op = Map::new();
    if let Some(summary) = raw_of(&api.summary) {
        op.insert("summary".into(), summary.into());
    }
    if let Some(desc) = text_of(&api.description) {
        op.insert("description".into(), desc.into());
    }
    if let Some(id) = raw_of(&api.id) {
        op.insert("operationId".into(), id.into());
    }
    if api.deprecated.is_some() {
        op.insert("deprecated".into(), true.into());
    }
    let tags: Vec<Value> = api.tags.iter().map(|t| t.text().into()).collect();
    if !tags.is_empty() {
        op.insert("tags".into(), tags.into());
    }

    let mut parameters: Vec<Value> = Vec::new();
    if let Some(path) = &api.path {
        for p in &path.params {
            parameters.push(parameter_of(p, "path", true));
        }
        for q in &path.queries {
            parameters.push(parameter_of(q, "query", false));
        }
    }
    for hdr in &api.headers {
        parameters.push(parameter_of(hdr, "header", false));
    }
    if !parameters.is_empty() {
        op.insert("parameters".into(), parameters.into());
    }

    if !api.requests.is_empty() {
        let mut content = Map::new();
        for req in &api.requests {
            let mime = raw_of(&req.mimetype).unwrap_or_else(|| "application/json".into());
            content.insert(mime, json!({ "schema": schema_of_request(req) }));
        }
        op.insert("requestBody".into(), json!({ "content": content }));
    }

    let mut responses = Map::new();
    for resp in &api.responses {
        let status = resp
            .status
            .as_ref()
            .map(|s| s.value.0.to_string())
            .unwrap_or_else(|| "default".into());
        let mut r = Map::new();
        r.insert(
            "description".into(),
            raw_of(&resp.summary).unwrap_or_default().into(),
        );
        let mime = raw_of(&resp.mimetype).unwrap_or_else(|| "application/json".into());
        if resp.rtype.is_some() {
            let mut content = Map::new();
            content.insert(mime, json!({ "schema": schema_of_request(resp) }));
            r.insert("content".into(), content.into());
        }
        responses.insert(status, r.into());
    }
    op.insert("responses".into(), responses.into());

    op.into()
}

fn parameter_of(p: &Param, location: &str, required: bool) -> Value {
    let optional = p.optional.as_ref().map(|o| o.value).unwrap_or(false);
    let mut v = Map::new();
    v.insert("name".into(), raw_of(&p.name).unwrap_or_default().into());
    v.insert("in".into(), location.into());
    v.insert("required".into(), (required || !optional).into());
    if let Some(summary) = raw_of(&p.summary) {
        v.insert("description".into(), summary.into());
    }
    v.insert("schema".into(), schema_of_param(p));
    v.into()
}

fn type_name(t: TypeValue) -> Option<&'static str> {
    match t {
        TypeValue::None => None,
        TypeValue::Bool => Some("boolean"),
        TypeValue::Object => Some("object"),
        TypeValue::Number => Some("number"),
        TypeValue::String => Some("string"),
    }
}

fn schema_common(
    t: Option<TypeValue>,
    array: bool,
    default: Option<String>,
    enums: Vec<String>,
    items: &[Param],
) -> Value {
    let mut schema = Map::new();
    if let Some(name) = t.and_then(type_name) {
        schema.insert("type".into(), name.into());
    }
    if let Some(d) = default {
        schema.insert("default".into(), d.into());
    }
    if !enums.is_empty() {
        schema.insert(
            "enum".into(),
            enums.into_iter().map(Value::from).collect::<Vec<_>>().into(),
        );
    }
    if t == Some(TypeValue::Object) {
        let mut properties = Map::new();
        let mut required: Vec<Value> = Vec::new();
        for item in items {
            let Some(name) = raw_of(&item.name) else { continue };
            let optional = item.optional.as_ref().map(|o| o.value).unwrap_or(false);
            if !optional {
                required.push(name.clone().into());
            }
            properties.insert(name, schema_of_param(item));
        }
        schema.insert("properties".into(), properties.into());
        if !required.is_empty() {
            schema.insert("required".into(), required.into());
        }
    }

    let schema: Value = schema.into();
    if array {
        json!({ "type": "array", "items": schema })
    } else {
        schema
    }
}

fn schema_of_param(p: &Param) -> Value {
    schema_common(
        p.ptype.as_ref().map(|t| t.value),
        p.array.as_ref().map(|a| a.value).unwrap_or(false),
        raw_of(&p.default),
        p.enums.iter().filter_map(|e| raw_of(&e.value)).collect(),
        &p.items,
    )
}

fn schema_of_request(r: &Request) -> Value {
    schema_common(
        r.rtype.as_ref().map(|t| t.value),
        r.array.as_ref().map(|a| a.value).unwrap_or(false),
        None,
        r.enums.iter().filter_map(|e| raw_of(&e.value)).collect(),
        &r.items,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcdoc_ast::block_from;
    use srcdoc_core::{MessageHandler, Uri};

    fn doc_from(blocks: &[&str]) -> ApiDoc {
        let h = MessageHandler::discard();
        let mut doc = ApiDoc::default();
        for (i, xml) in blocks.iter().enumerate() {
            doc.parse(&h, &block_from(Uri::new(format!("f{i}.go")), xml.as_bytes().to_vec()));
        }
        h.stop();
        doc
    }

    #[test]
    fn test_convert_minimal() {
        let doc = doc_from(&[
            r#"<apidoc version="1.2.3"><title>Pet Store</title><mimetype>application/json</mimetype></apidoc>"#,
            r#"<api method="GET" summary="list pets"><path path="/pets/{id}"><param name="id" type="number"/><query name="limit" type="number" optional="true"/></path><response status="200" type="object" mimetype="application/json"><param name="name" type="string"/></response></api>"#,
        ]);

        let v = convert(&doc);
        assert_eq!(v["openapi"], "3.0.3");
        assert_eq!(v["info"]["title"], "Pet Store");
        assert_eq!(v["info"]["version"], "1.2.3");

        let op = &v["paths"]["/pets/{id}"]["get"];
        assert_eq!(op["summary"], "list pets");
        let params = op["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0]["in"], "path");
        assert_eq!(params[0]["required"], true);
        assert_eq!(params[1]["in"], "query");
        assert_eq!(params[1]["required"], false);

        let resp = &op["responses"]["200"];
        let schema = &resp["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["name"]["type"], "string");
    }

    #[test]
    fn test_array_and_enum_schemas() {
        let doc = doc_from(&[
            r#"<api method="GET"><path path="/x"><query name="state" type="string" array="true"><enum value="on"/><enum value="off"/></query></path></api>"#,
        ]);
        let v = convert(&doc);
        let schema = &v["paths"]["/x"]["get"]["parameters"][0]["schema"];
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["enum"][0], "on");
    }

    #[test]
    fn test_methods_group_under_one_path() {
        let doc = doc_from(&[
            r#"<api method="GET"><path path="/x"/></api>"#,
            r#"<api method="DELETE"><path path="/x"/></api>"#,
        ]);
        let v = convert(&doc);
        let item = v["paths"]["/x"].as_object().unwrap();
        assert!(item.contains_key("get"));
        assert!(item.contains_key("delete"));
    }
}
