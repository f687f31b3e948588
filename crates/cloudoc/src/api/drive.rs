use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{query, segment, with_json, DocType};
use crate::client::{Client, Response};
use crate::error::Result;
use crate::http::{HttpClient, HttpRequest};

/// The caller's root folder
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RootFolderMeta {
    pub id: String,
    pub token: String,
    pub user_id: String,
}

/// Direct children of a folder, keyed by token
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FolderChildren {
    #[serde(rename = "parentToken")]
    pub parent_token: String,
    pub children: HashMap<String, ChildInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChildInfo {
    pub token: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A document to look up in [`Client::get_docs_meta`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocRef {
    pub docs_token: String,
    pub docs_type: DocType,
}

impl DocRef {
    pub fn new(docs_token: impl Into<String>, docs_type: DocType) -> Self {
        Self {
            docs_token: docs_token.into(),
            docs_type,
        }
    }
}

#[derive(Debug, Serialize)]
struct DocsMetaRequest<'a> {
    request_docs: &'a [DocRef],
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocsMetas {
    pub docs_metas: Vec<DocMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocMeta {
    /// Unix seconds
    pub create_time: i64,
    pub docs_token: String,
    pub docs_type: String,
    /// Unix seconds
    pub latest_modify_time: i64,
    pub latest_modify_user: String,
    pub owner_id: String,
    pub title: String,
}

impl<H: HttpClient> Client<H> {
    /// Gets the token of the root folder
    pub async fn get_root_folder_meta(&self) -> Result<Response<RootFolderMeta>> {
        let url = self.url("/open-apis/drive/explorer/v2/root_folder/meta");
        self.call(HttpRequest::get(url)).await
    }

    /// Lists a folder, optionally restricted to some document types
    pub async fn get_folder_children(
        &self,
        folder_token: &str,
        types: &[DocType],
    ) -> Result<Response<FolderChildren>> {
        let pairs: Vec<_> = types.iter().map(|t| ("types", Some(t.as_str()))).collect();
        let url = self.url(&format!(
            "/open-apis/drive/explorer/v2/folder/{}/children{}",
            segment(folder_token),
            query(&pairs)
        ));
        self.call(HttpRequest::get(url)).await
    }

    /// Fetches metadata (title, owner, timestamps) of several documents
    pub async fn get_docs_meta(&self, docs: &[DocRef]) -> Result<Response<DocsMetas>> {
        let url = self.url("/open-apis/suite/docs-api/meta");
        let request = with_json(HttpRequest::post(url), &DocsMetaRequest { request_docs: docs })?;
        self.call(request).await
    }
}
