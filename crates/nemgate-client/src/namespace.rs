use nemgate_common::protocol::{clamp_page_size, DEFAULT_PAGE_SIZE};
use nemgate_common::{NemgateError, NetworkContext, PageResponse, QueryParams, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::endpoint::HttpEndpoint;
use crate::endpoint_pool::EndpointPool;
use crate::pageable::{Pageable, PagedResource};

const RESOURCE: &str = "namespace";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Fully qualified name, e.g. `nem` or `foo.bar`.
    pub fqn: String,
    /// Address of the owner.
    pub owner: String,
    /// Height at which the namespace was rented.
    pub height: u64,
    /// Database id; only present in paged listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NamespaceDto {
    fqn: String,
    owner: String,
    height: u64,
}

#[derive(Debug, Deserialize)]
struct MetaDto {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct NamespaceMetaDataPairDto {
    meta: MetaDto,
    namespace: NamespaceDto,
}

impl From<NamespaceDto> for Namespace {
    fn from(dto: NamespaceDto) -> Self {
        Self {
            fqn: dto.fqn,
            owner: dto.owner,
            height: dto.height,
            id: None,
        }
    }
}

impl From<NamespaceMetaDataPairDto> for Namespace {
    fn from(pair: NamespaceMetaDataPairDto) -> Self {
        Self {
            id: Some(pair.meta.id),
            ..Namespace::from(pair.namespace)
        }
    }
}

/// Namespace queries.
#[derive(Debug, Clone)]
pub struct NamespaceHttp {
    endpoint: HttpEndpoint,
}

impl NamespaceHttp {
    pub fn new(ctx: &NetworkContext, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            endpoint: HttpEndpoint::new(RESOURCE, ctx, config)?,
        })
    }

    pub fn with_pool(pool: Arc<EndpointPool>, config: &ClientConfig) -> Self {
        Self {
            endpoint: HttpEndpoint::with_pool(RESOURCE, pool, config),
        }
    }

    pub fn endpoint(&self) -> &HttpEndpoint {
        &self.endpoint
    }

    /// Gets one page of root namespaces, newest first.
    ///
    /// # Arguments
    /// * `id` - topmost database id up to which namespaces are returned; `None` for the most recent
    /// * `page_size` - number of namespaces per page; the node defaults to 25 and accepts 5 to 100
    pub async fn get_root_namespaces(&self, id: Option<u64>, page_size: Option<u32>) -> Result<Vec<Namespace>> {
        let query = QueryParams { id, page_size }.to_query_string();
        let page: PageResponse<NamespaceMetaDataPairDto> = self.endpoint.get("root/page", &query).await?;
        Ok(page.into_items().into_iter().map(Namespace::from).collect())
    }

    /// Pages through all root namespaces starting at `params`.
    ///
    /// Nodes serve between 5 and 100 namespaces per page, so the requested
    /// page size is clamped into that range.
    pub fn get_root_namespaces_paginated(&self, params: QueryParams) -> Pageable<'_, Self> {
        Pageable::new(self, params)
    }

    /// Gets a namespace by its fully qualified name.
    pub async fn get_namespace(&self, name: &str) -> Result<Namespace> {
        validate_namespace_name(name)?;
        let dto: NamespaceDto = self.endpoint.get("", &format!("namespace={}", name)).await?;
        Ok(dto.into())
    }
}

impl PagedResource for NamespaceHttp {
    type Item = Namespace;

    fn fetch_page(&self, params: QueryParams) -> impl Future<Output = Result<Vec<Namespace>>> + Send {
        self.get_root_namespaces(params.id, params.page_size.map(clamp_page_size))
    }

    fn served_page_size(&self, requested: Option<u32>) -> u32 {
        clamp_page_size(requested.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    fn cursor_of(item: &Namespace) -> Option<u64> {
        item.id
    }
}

/// Namespace parts are lowercase alphanumerics, `-` and `_`, joined by `.`.
fn validate_namespace_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(NemgateError::InvalidRequest(format!("invalid namespace name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_meta_data_pair_mapping() {
        let page: PageResponse<NamespaceMetaDataPairDto> = serde_json::from_value(json!({
            "data": [
                {"meta": {"id": 26754}, "namespace": {"fqn": "nem", "owner": "TALICE", "height": 440493}},
                {"meta": {"id": 26753}, "namespace": {"fqn": "foo", "owner": "TBOB", "height": 440000}}
            ]
        }))
        .unwrap();

        let namespaces: Vec<Namespace> = page.into_items().into_iter().map(Namespace::from).collect();
        assert_eq!(namespaces.len(), 2);
        assert_eq!(namespaces[0].fqn, "nem");
        assert_eq!(namespaces[0].id, Some(26754));
        assert_eq!(NamespaceHttp::cursor_of(&namespaces[1]), Some(26753));
    }

    #[test]
    fn test_plain_namespace_has_no_id() {
        let dto: NamespaceDto =
            serde_json::from_value(json!({"fqn": "nem.xem", "owner": "TALICE", "height": 1})).unwrap();
        let namespace = Namespace::from(dto);
        assert_eq!(namespace.id, None);
        assert_eq!(NamespaceHttp::cursor_of(&namespace), None);
    }

    #[test]
    fn test_serialize_omits_missing_id() {
        let namespace = Namespace {
            fqn: "nem".into(),
            owner: "TALICE".into(),
            height: 1,
            id: None,
        };
        assert_eq!(
            serde_json::to_value(&namespace).unwrap(),
            json!({"fqn": "nem", "owner": "TALICE", "height": 1})
        );
    }

    #[test]
    fn test_served_page_size_follows_node_limits() {
        let pool = Arc::new(EndpointPool::single(nemgate_common::NodeDescriptor::http("node1", 7890)));
        let namespaces = NamespaceHttp::with_pool(pool, &ClientConfig::default());
        assert_eq!(namespaces.served_page_size(None), 25);
        assert_eq!(namespaces.served_page_size(Some(1)), 5);
        assert_eq!(namespaces.served_page_size(Some(40)), 40);
        assert_eq!(namespaces.served_page_size(Some(500)), 100);
    }

    #[test]
    fn test_namespace_name_validation() {
        assert!(validate_namespace_name("nem").is_ok());
        assert!(validate_namespace_name("foo.bar-baz_1").is_ok());
        assert!(validate_namespace_name("").is_err());
        assert!(validate_namespace_name("foo..bar").is_err());
        assert!(validate_namespace_name("Foo").is_err());
        assert!(validate_namespace_name("a&b=c").is_err());
    }
}
