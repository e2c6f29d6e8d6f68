use uuid::Uuid;
use vesper_core::models::{
    AuthUser, ChurchListQuery, ForumListQuery, HymnListQuery, MediaListQuery, PageRequest,
    PrayerListQuery, SongListQuery,
};
use vesper_core::AppError;
use vesper_db::{ColumnValues, SqlValue};

use crate::constants::MIN_SEARCH_QUERY_LEN;

/// Parse a path segment as a UUID, 400 when malformed.
pub fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput(format!("Invalid id: {}", raw)))
}

/// Who may perform a mutating operation on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in user
    Authenticated,
    /// Moderators and admins
    Staff,
    Admin,
    /// The record's owner, or staff
    OwnerOrStaff,
}

impl Access {
    /// `owner` is the owning user of the record being touched, when the operation targets one.
    pub fn authorize(self, user: &AuthUser, owner: Option<Uuid>) -> Result<(), AppError> {
        let allowed = match self {
            Access::Authenticated => true,
            Access::Staff => user.is_staff(),
            Access::Admin => user.is_admin(),
            Access::OwnerOrStaff => owner.map_or(user.is_staff(), |id| user.can_modify(id)),
        };
        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(match self {
                Access::Admin => "Admin access required".to_string(),
                Access::Staff => "Moderator or admin access required".to_string(),
                _ => "You do not have permission to modify this resource".to_string(),
            }))
        }
    }
}

/// Common list parameters shared by every paginated query struct
pub trait ListQuery {
    fn page_request(&self) -> PageRequest;

    fn search(&self) -> Option<&str> {
        None
    }

    fn sort(&self) -> Option<&str>;

    fn order(&self) -> Option<&str>;
}

macro_rules! impl_list_query {
    ($ty:ty, searchable) => {
        impl ListQuery for $ty {
            fn page_request(&self) -> PageRequest {
                PageRequest::from_query(self.page, self.limit)
            }

            fn search(&self) -> Option<&str> {
                self.search.as_deref()
            }

            fn sort(&self) -> Option<&str> {
                self.sort.as_deref()
            }

            fn order(&self) -> Option<&str> {
                self.order.as_deref()
            }
        }
    };
    ($ty:ty) => {
        impl ListQuery for $ty {
            fn page_request(&self) -> PageRequest {
                PageRequest::from_query(self.page, self.limit)
            }

            fn sort(&self) -> Option<&str> {
                self.sort.as_deref()
            }

            fn order(&self) -> Option<&str> {
                self.order.as_deref()
            }
        }
    };
}

impl_list_query!(HymnListQuery, searchable);
impl_list_query!(SongListQuery, searchable);
impl_list_query!(ChurchListQuery, searchable);
impl_list_query!(ForumListQuery, searchable);
impl_list_query!(MediaListQuery, searchable);
impl_list_query!(PrayerListQuery);

/// Trimmed, non-empty optional string
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The required `q` parameter of the search endpoints, trimmed.
pub fn search_term(q: Option<&str>) -> Result<&str, AppError> {
    let term = q.map(str::trim).unwrap_or_default();
    if term.chars().count() < MIN_SEARCH_QUERY_LEN {
        return Err(AppError::InvalidInput(format!(
            "Search query 'q' must be at least {} characters",
            MIN_SEARCH_QUERY_LEN
        )));
    }
    Ok(term)
}

/// Append `column = value` to a partial update when the field was supplied.
pub fn set_if_present<T: Into<SqlValue>>(
    values: &mut ColumnValues,
    column: &'static str,
    value: Option<T>,
) {
    if let Some(value) = value {
        values.push((column, value.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::models::UserRole;

    #[test]
    fn malformed_id_is_invalid_input() {
        assert!(matches!(parse_uuid("not-a-uuid"), Err(AppError::InvalidInput(_))));
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn owner_or_staff() {
        let owner = Uuid::new_v4();
        let stranger = AuthUser::new(Uuid::new_v4(), UserRole::User);
        let moderator = AuthUser::new(Uuid::new_v4(), UserRole::Moderator);
        assert!(Access::OwnerOrStaff.authorize(&stranger, Some(owner)).is_err());
        assert!(Access::OwnerOrStaff
            .authorize(&AuthUser::new(owner, UserRole::User), Some(owner))
            .is_ok());
        assert!(Access::OwnerOrStaff.authorize(&moderator, Some(owner)).is_ok());
    }

    #[test]
    fn admin_access_excludes_moderators() {
        let moderator = AuthUser::new(Uuid::new_v4(), UserRole::Moderator);
        let admin = AuthUser::new(Uuid::new_v4(), UserRole::Admin);
        assert!(matches!(
            Access::Admin.authorize(&moderator, None),
            Err(AppError::Forbidden(_))
        ));
        assert!(Access::Admin.authorize(&admin, None).is_ok());
        assert!(Access::Staff.authorize(&moderator, None).is_ok());
    }

    #[test]
    fn list_query_defaults() {
        let query = HymnListQuery {
            page: Some(0),
            limit: Some(500),
            search: Some("grace".into()),
            ..Default::default()
        };
        let page = query.page_request();
        assert_eq!((page.page, page.limit), (1, 100));
        assert_eq!(query.search(), Some("grace"));
        assert_eq!(PrayerListQuery::default().search(), None);
    }

    #[test]
    fn partial_update_skips_missing_fields() {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "title", Some("Be Thou My Vision".to_string()));
        set_if_present::<String>(&mut values, "author", None);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].0, "title");
    }

    #[test]
    fn search_term_requires_two_characters() {
        assert!(search_term(None).is_err());
        assert!(search_term(Some(" a ")).is_err());
        assert_eq!(search_term(Some("  hope ")).unwrap(), "hope");
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" praise ")), Some("praise"));
    }
}
