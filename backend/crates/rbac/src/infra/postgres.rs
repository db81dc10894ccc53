//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{PermissionId, RoleId, UserId};
use sqlx::PgPool;

use crate::domain::entity::{
    permission::Permission,
    role::{NewRole, Role, RoleChanges},
    user::{NewUser, User, UserChanges},
};
use crate::domain::repository::{PermissionRepository, RoleRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::UserPassword};
use crate::error::{RbacError, RbacResult};

/// PostgreSQL-backed RBAC repository
#[derive(Clone)]
pub struct PgRbacRepository {
    pool: PgPool,
}

impl PgRbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map constraint violations to `Conflict`, everything else to `Database`
fn conflict_on_violation(err: sqlx::Error, message: &str) -> RbacError {
    let violation = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation() || db.is_foreign_key_violation());

    if violation {
        RbacError::Conflict(message.to_string())
    } else {
        RbacError::Database(err)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

const USER_SELECT: &str = r#"
    SELECT
        u.id,
        u.name,
        u.email,
        u.password,
        u.role_id,
        r.role_name,
        u.created_at
    FROM users u
    LEFT JOIN roles r ON r.id = u.role_id
"#;

impl UserRepository for PgRbacRepository {
    async fn find_all(&self) -> RbacResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} ORDER BY u.id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn find_by_id(&self, id: UserId) -> RbacResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &Email) -> RbacResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn create(&self, user: &NewUser) -> RbacResult<UserId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, password, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.role_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_violation(e, "Email is already taken"))?;

        Ok(UserId::new(id))
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> RbacResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                role_id = $4,
                password = COALESCE($5, password)
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&changes.name)
        .bind(changes.email.as_str())
        .bind(changes.role_id.get())
        .bind(changes.password.as_ref().map(|p| p.as_phc_string()))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_violation(e, "Email is already taken"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: UserId) -> RbacResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn email_exists(&self, email: &Email, excluding: Option<UserId>) -> RbacResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email.as_str())
        .bind(excluding.map(|id| id.get()))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

/// One row per (role, attached permission); roles without permissions
/// appear once with NULL permission columns.
const ROLE_SELECT: &str = r#"
    SELECT
        r.id AS role_id,
        r.role_name,
        r.created_at AS role_created_at,
        p.id AS permission_id,
        p.permission_name,
        p.created_at AS permission_created_at
    FROM roles r
    LEFT JOIN role_has_permissions rp ON rp.role_id = r.id
    LEFT JOIN permissions p ON p.id = rp.permission_id
"#;

impl PgRbacRepository {
    async fn fetch_roles(&self, filter: RoleFilter<'_>) -> RbacResult<Vec<Role>> {
        let rows = match filter {
            RoleFilter::All => {
                sqlx::query_as::<_, RolePermissionRow>(&format!(
                    "{ROLE_SELECT} ORDER BY r.id, p.id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            RoleFilter::Id(id) => {
                sqlx::query_as::<_, RolePermissionRow>(&format!(
                    "{ROLE_SELECT} WHERE r.id = $1 ORDER BY p.id"
                ))
                .bind(id.get())
                .fetch_all(&self.pool)
                .await?
            }
            RoleFilter::Name(name) => {
                sqlx::query_as::<_, RolePermissionRow>(&format!(
                    "{ROLE_SELECT} WHERE r.role_name = $1 ORDER BY p.id"
                ))
                .bind(name)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(fold_role_rows(rows))
    }
}

enum RoleFilter<'a> {
    All,
    Id(RoleId),
    Name(&'a str),
}

/// Attach permissions to roles; rows must be ordered by role id
fn fold_role_rows(rows: Vec<RolePermissionRow>) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();

    for row in rows {
        let permission = row.permission();
        if let Some(role) = roles.last_mut().filter(|r| r.id.get() == row.role_id) {
            role.permissions.extend(permission);
            continue;
        }
        roles.push(Role {
            id: RoleId::new(row.role_id),
            name: row.role_name,
            permissions: permission.into_iter().collect(),
            created_at: row.role_created_at,
        });
    }

    roles
}

async fn attach_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_id: i64,
    permission_ids: &[PermissionId],
) -> RbacResult<()> {
    if permission_ids.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = permission_ids.iter().map(|id| id.get()).collect();
    sqlx::query(
        r#"
        INSERT INTO role_has_permissions (role_id, permission_id)
        SELECT $1::BIGINT, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(ids)
    .execute(&mut **tx)
    .await
    .map_err(|e| conflict_on_violation(e, "Permission does not exist"))?;

    Ok(())
}

impl RoleRepository for PgRbacRepository {
    async fn find_all(&self) -> RbacResult<Vec<Role>> {
        self.fetch_roles(RoleFilter::All).await
    }

    async fn find_by_id(&self, id: RoleId) -> RbacResult<Option<Role>> {
        Ok(self.fetch_roles(RoleFilter::Id(id)).await?.into_iter().next())
    }

    async fn find_by_name(&self, name: &str) -> RbacResult<Option<Role>> {
        Ok(self
            .fetch_roles(RoleFilter::Name(name))
            .await?
            .into_iter()
            .next())
    }

    async fn create(&self, role: &NewRole) -> RbacResult<RoleId> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO roles (role_name) VALUES ($1) RETURNING id",
        )
        .bind(&role.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_violation(e, "Role name is already taken"))?;

        attach_permissions(&mut tx, id, &role.permission_ids).await?;

        tx.commit().await?;
        Ok(RoleId::new(id))
    }

    async fn update(&self, id: RoleId, changes: &RoleChanges) -> RbacResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE roles SET role_name = $2 WHERE id = $1")
            .bind(id.get())
            .bind(&changes.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_violation(e, "Role name is already taken"))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Ok(false);
        }

        if let Some(permission_ids) = &changes.permission_ids {
            sqlx::query("DELETE FROM role_has_permissions WHERE role_id = $1")
                .bind(id.get())
                .execute(&mut *tx)
                .await?;

            attach_permissions(&mut tx, id.get(), permission_ids).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: RoleId) -> RbacResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_has_permissions WHERE role_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_violation(e, "Role is still assigned to users"))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn name_exists(&self, name: &str, excluding: Option<RoleId>) -> RbacResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM roles WHERE role_name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(excluding.map(|id| id.get()))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Permission Repository Implementation
// ============================================================================

impl PermissionRepository for PgRbacRepository {
    async fn find_all(&self) -> RbacResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT id, permission_name, created_at FROM permissions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PermissionRow::into_permission).collect())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    role_id: i64,
    role_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: UserId::new(self.id),
            name: self.name,
            email: Email::from_db(self.email),
            password: UserPassword::from_db(self.password),
            role_id: RoleId::new(self.role_id),
            role_name: self.role_name,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RolePermissionRow {
    role_id: i64,
    role_name: String,
    role_created_at: DateTime<Utc>,
    permission_id: Option<i64>,
    permission_name: Option<String>,
    permission_created_at: Option<DateTime<Utc>>,
}

impl RolePermissionRow {
    fn permission(&self) -> Option<Permission> {
        match (
            self.permission_id,
            &self.permission_name,
            self.permission_created_at,
        ) {
            (Some(id), Some(name), Some(created_at)) => Some(Permission {
                id: PermissionId::new(id),
                name: name.clone(),
                created_at,
            }),
            _ => None,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PermissionRow {
    id: i64,
    permission_name: String,
    created_at: DateTime<Utc>,
}

impl PermissionRow {
    fn into_permission(self) -> Permission {
        Permission {
            id: PermissionId::new(self.id),
            name: self.permission_name,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role_id: i64, name: &str, permission: Option<(i64, &str)>) -> RolePermissionRow {
        let now = Utc::now();
        RolePermissionRow {
            role_id,
            role_name: name.to_string(),
            role_created_at: now,
            permission_id: permission.map(|p| p.0),
            permission_name: permission.map(|p| p.1.to_string()),
            permission_created_at: permission.map(|_| now),
        }
    }

    #[test]
    fn test_fold_role_rows_groups_permissions() {
        let roles = fold_role_rows(vec![
            row(1, "SuperAdmin", None),
            row(3, "User", Some((1, "create-users"))),
            row(3, "User", Some((4, "view-all-users"))),
            row(4, "Editor", None),
        ]);

        assert_eq!(roles.len(), 3);
        assert!(roles[0].permissions.is_empty());
        assert_eq!(roles[1].name, "User");
        assert_eq!(
            roles[1].permission_ids(),
            vec![PermissionId::new(1), PermissionId::new(4)]
        );
        assert!(roles[2].permissions.is_empty());
    }

    #[test]
    fn test_fold_role_rows_empty() {
        assert!(fold_role_rows(Vec::new()).is_empty());
    }
}
