//! Member persistence contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the storage-collaborator trait the editor is parameterized
//!   by, plus a no-op sink and a SQLite-backed repository.
//! - Keep SQL and the comma-joined id column encoding inside this
//!   boundary.
//!
//! # Invariants
//! - Write paths report semantic `NotFound` in addition to transport
//!   errors.
//! - Read paths reject corrupt persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::member::{Member, MemberId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    name,
    generation,
    x,
    y,
    parent_ids,
    children,
    spouse_id,
    position_pinned,
    birth_year,
    death_year,
    photo_ref,
    created_at,
    updated_at
FROM members";

/// Result type used by persistence operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from member persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target member row does not exist.
    NotFound(MemberId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid member record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "member row not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "member repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted member data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage collaborator the editor emits member changes through.
///
/// The editor treats its in-memory store as authoritative and calls
/// this sink best-effort, once per changed member.
pub trait MemberPersistence {
    /// Loads every persisted member in ascending id order.
    fn load_all(&self) -> RepoResult<Vec<Member>>;
    /// Persists one newly created member.
    fn create(&self, member: &Member) -> RepoResult<()>;
    /// Persists one changed member.
    fn update(&self, member: &Member) -> RepoResult<()>;
    /// Deletes one member row.
    fn delete(&self, id: MemberId) -> RepoResult<()>;
}

/// No-op sink for purely local graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl MemberPersistence for NoPersistence {
    fn load_all(&self) -> RepoResult<Vec<Member>> {
        Ok(Vec::new())
    }

    fn create(&self, _member: &Member) -> RepoResult<()> {
        Ok(())
    }

    fn update(&self, _member: &Member) -> RepoResult<()> {
        Ok(())
    }

    fn delete(&self, _id: MemberId) -> RepoResult<()> {
        Ok(())
    }
}

/// SQLite-backed member repository.
///
/// Stores relationship id sets as comma-joined TEXT columns; parsing
/// happens only at this boundary, the in-memory records keep native id
/// collections.
#[derive(Debug)]
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl MemberPersistence for SqliteMemberRepository<'_> {
    fn load_all(&self) -> RepoResult<Vec<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn create(&self, member: &Member) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO members (
                id,
                name,
                generation,
                x,
                y,
                parent_ids,
                children,
                spouse_id,
                position_pinned,
                birth_year,
                death_year,
                photo_ref,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                member.id,
                member.name,
                i64::from(member.generation),
                member.x,
                member.y,
                join_ids(&member.parent_ids),
                join_ids(&member.children),
                member.spouse_id,
                member.position_pinned as i64,
                member.birth_year,
                member.death_year,
                member.photo_ref,
                member.created_at,
                member.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, member: &Member) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET
                name = ?2,
                generation = ?3,
                x = ?4,
                y = ?5,
                parent_ids = ?6,
                children = ?7,
                spouse_id = ?8,
                position_pinned = ?9,
                birth_year = ?10,
                death_year = ?11,
                photo_ref = ?12,
                updated_at = ?13
             WHERE id = ?1;",
            params![
                member.id,
                member.name,
                i64::from(member.generation),
                member.x,
                member.y,
                join_ids(&member.parent_ids),
                join_ids(&member.children),
                member.spouse_id,
                member.position_pinned as i64,
                member.birth_year,
                member.death_year,
                member.photo_ref,
                member.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(member.id));
        }
        Ok(())
    }

    fn delete(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1;", params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let generation_raw: i64 = row.get("generation")?;
    let generation = u32::try_from(generation_raw).map_err(|_| {
        RepoError::InvalidData(format!("negative generation `{generation_raw}` in members"))
    })?;

    let position_pinned = match row.get::<_, i64>("position_pinned")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid position_pinned value `{other}` in members"
            )));
        }
    };

    let parent_ids_text: String = row.get("parent_ids")?;
    let children_text: String = row.get("children")?;

    Ok(Member {
        id: row.get("id")?,
        name: row.get("name")?,
        generation,
        x: row.get("x")?,
        y: row.get("y")?,
        parent_ids: split_ids(&parent_ids_text, "members.parent_ids")?,
        children: split_ids(&children_text, "members.children")?,
        spouse_id: row.get("spouse_id")?,
        position_pinned,
        birth_year: row.get("birth_year")?,
        death_year: row.get("death_year")?,
        photo_ref: row.get("photo_ref")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn join_ids(ids: &[MemberId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_ids(value: &str, column: &'static str) -> RepoResult<Vec<MemberId>> {
    value
        .split(',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<MemberId>()
                .map_err(|_| RepoError::InvalidData(format!("invalid id `{part}` in {column}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{join_ids, split_ids};

    #[test]
    fn join_and_split_ids_round_trip() {
        let ids = vec![1, 2, 30];
        let joined = join_ids(&ids);
        assert_eq!(joined, "1,2,30");
        assert_eq!(split_ids(&joined, "members.parent_ids").unwrap(), ids);
    }

    #[test]
    fn split_ids_handles_empty_column() {
        assert!(split_ids("", "members.children").unwrap().is_empty());
    }

    #[test]
    fn split_ids_rejects_garbage() {
        assert!(split_ids("1,abc", "members.children").is_err());
    }
}
