//! The organisational structure: departments and the users within them.
//!
//! The directory is snapshotted once when the client connects and never
//! refreshed, so renames or moves on the WeCom side are invisible until a
//! new client is constructed.

use crate::{api, api::WorkClient, error::WorkError};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Departments are referred to by a numeric id, stable across renames.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DepartmentId(pub i64);

/// Format without the surrounding newtype wrapper.
///
/// ```
/// use wecom::directory::DepartmentId;
///
/// assert_eq!(DepartmentId(2).to_string(), "2");
/// ```
impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The account id of a member within the enterprise.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An organisational unit node. The root department carries no parent, and
/// the API omits `order` for accounts that never customised it.
#[derive(Clone, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(rename = "parentid")]
    pub parent_id: Option<DepartmentId>,
    pub order: Option<i64>,
}

/// A member of the enterprise, possibly belonging to several departments.
#[derive(Clone, Deserialize)]
pub struct User {
    pub userid: UserId,
    pub name: String,
    #[serde(default)]
    pub department: Vec<DepartmentId>,
}

/// The department and user maps, keyed by their respective ids.
#[derive(Default)]
pub struct Directory {
    pub departments: HashMap<DepartmentId, Department>,
    pub users: HashMap<UserId, User>,
}

/// <https://developer.work.weixin.qq.com/document/path/90208>
#[derive(Deserialize)]
struct DepartmentListResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
    department: Vec<Department>,
}

/// <https://developer.work.weixin.qq.com/document/path/90200>
#[derive(Serialize)]
struct UserListRequest {
    department_id: i64,
}

#[derive(Deserialize)]
struct UserListResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::zero")]
    errcode: i64,
    userlist: Vec<User>,
}

impl WorkClient {
    /// List every department visible to the application.
    pub async fn fetch_departments(&self) -> Result<Vec<Department>, WorkError> {
        let res: DepartmentListResponse =
            api::dispatch(self.get("/cgi-bin/department/list")).await?;

        Ok(res.department)
    }

    /// List the users directly within a department.
    pub async fn fetch_users(&self, department: DepartmentId) -> Result<Vec<User>, WorkError> {
        let res: UserListResponse = api::dispatch(
            self.get("/cgi-bin/user/simplelist").query(&UserListRequest {
                department_id: department.0,
            }),
        )
        .await?;

        Ok(res.userlist)
    }

    /// Fetch the whole directory: one department-list call, then one
    /// user-list call per resulting department id, sequentially. The first
    /// error aborts the fetch with nothing populated.
    pub async fn fetch_directory(&self) -> Result<Directory, WorkError> {
        let mut directory = Directory::default();

        for department in self.fetch_departments().await? {
            directory.departments.insert(department.id, department);
        }

        let ids: Vec<DepartmentId> = directory.departments.keys().copied().collect();

        for id in ids {
            for user in self.fetch_users(id).await? {
                directory.users.insert(user.userid.clone(), user);
            }
        }

        Ok(directory)
    }

    /// The department map snapshotted at connect time.
    pub fn departments(&self) -> &HashMap<DepartmentId, Department> {
        &self.directory.departments
    }

    /// The user map snapshotted at connect time. A user belonging to
    /// several departments appears once.
    pub fn users(&self) -> &HashMap<UserId, User> {
        &self.directory.users
    }
}
