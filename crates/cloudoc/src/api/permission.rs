use serde::{Deserialize, Serialize};

use super::{query, segment, with_json, DocType};
use crate::client::{Client, Response};
use crate::error::Result;
use crate::http::{HttpClient, HttpRequest};

/// How a collaborator is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberType {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "openid")]
    OpenId,
    #[serde(rename = "openchat")]
    OpenChat,
    #[serde(rename = "opendepartmentid")]
    OpenDepartmentId,
    #[serde(rename = "userid")]
    UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perm {
    View,
    Edit,
    FullAccess,
}

/// Grants `perm` on a document to one collaborator
#[derive(Debug, Clone, Serialize)]
pub struct AddMemberRequest {
    #[serde(skip)]
    pub file_token: String,
    #[serde(skip)]
    pub doc_type: DocType,
    #[serde(skip)]
    pub need_notification: bool,
    pub member_type: MemberType,
    pub member_id: String,
    pub perm: Perm,
}

impl AddMemberRequest {
    pub fn new(
        file_token: impl Into<String>,
        doc_type: DocType,
        member_type: MemberType,
        member_id: impl Into<String>,
        perm: Perm,
    ) -> Self {
        Self {
            file_token: file_token.into(),
            doc_type,
            need_notification: false,
            member_type,
            member_id: member_id.into(),
            perm,
        }
    }

    /// Notifies the new collaborator
    pub fn notify(mut self) -> Self {
        self.need_notification = true;
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PermissionMember {
    pub member: Member,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Member {
    pub member_id: String,
    pub member_type: String,
    pub perm: String,
}

impl<H: HttpClient> Client<H> {
    /// Adds a collaborator to a document
    pub async fn add_permission_member(
        &self,
        request: &AddMemberRequest,
    ) -> Result<Response<PermissionMember>> {
        let notify = if request.need_notification { "true" } else { "false" };
        let url = self.url(&format!(
            "/open-apis/drive/v1/permissions/{}/members{}",
            segment(&request.file_token),
            query(&[
                ("type", Some(request.doc_type.as_str())),
                ("need_notification", Some(notify)),
            ])
        ));
        self.call(with_json(HttpRequest::post(url), request)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{authed_mock, ok_envelope, test_client, BASE_URL};
    use serde_json::json;

    #[tokio::test]
    async fn add_member_sends_query_and_body() {
        let url = format!(
            "{BASE_URL}/open-apis/drive/v1/permissions/doccn_1/members?type=doc&need_notification=true"
        );
        let mock = authed_mock().on_json(
            &url,
            &ok_envelope(json!({
                "member": {"member_id": "ou_1", "member_type": "openid", "perm": "edit"}
            })),
        );
        let client = test_client(mock.clone());

        let request =
            AddMemberRequest::new("doccn_1", DocType::Doc, MemberType::OpenId, "ou_1", Perm::Edit)
                .notify();
        let response = client.add_permission_member(&request).await.unwrap();

        assert_eq!(response.data.member.perm, "edit");

        let sent = mock
            .get_requests()
            .into_iter()
            .find(|r| r.url == url)
            .unwrap();
        assert_eq!(
            sent.json(),
            json!({"member_type": "openid", "member_id": "ou_1", "perm": "edit"})
        );
    }

    #[tokio::test]
    async fn add_member_defaults_to_silent() {
        let url = format!(
            "{BASE_URL}/open-apis/drive/v1/permissions/shtcn_2/members?type=sheet&need_notification=false"
        );
        let mock = authed_mock().on_json(&url, &ok_envelope(json!({})));
        let client = test_client(mock.clone());

        let request = AddMemberRequest::new(
            "shtcn_2",
            DocType::Sheet,
            MemberType::Email,
            "someone@example.com",
            Perm::FullAccess,
        );
        client.add_permission_member(&request).await.unwrap();

        assert_eq!(mock.request_count_for(&url), 1);
    }

    #[test]
    fn member_type_wire_names() {
        assert_eq!(
            serde_json::to_value(MemberType::OpenDepartmentId).unwrap(),
            "opendepartmentid"
        );
        assert_eq!(serde_json::to_value(Perm::FullAccess).unwrap(), "full_access");
    }
}
