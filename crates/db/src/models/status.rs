//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Bulk import job lifecycle status.
    ///
    /// `Admitted` covers both full and partial admission; the difference is
    /// visible through `skipped_count` on the job row.
    ImportJobStatus {
        Pending = 1,
        Analyzing = 2,
        Admitted = 3,
        Running = 4,
        Completed = 5,
        Failed = 6,
    }
}

impl ImportJobStatus {
    /// Look up a variant from its database ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(ImportJobStatus::Pending),
            2 => Some(ImportJobStatus::Analyzing),
            3 => Some(ImportJobStatus::Admitted),
            4 => Some(ImportJobStatus::Running),
            5 => Some(ImportJobStatus::Completed),
            6 => Some(ImportJobStatus::Failed),
            _ => None,
        }
    }

    /// Lowercase name matching the seed data row.
    pub fn name(self) -> &'static str {
        match self {
            ImportJobStatus::Pending => "pending",
            ImportJobStatus::Analyzing => "analyzing",
            ImportJobStatus::Admitted => "admitted",
            ImportJobStatus::Running => "running",
            ImportJobStatus::Completed => "completed",
            ImportJobStatus::Failed => "failed",
        }
    }
}

define_status_enum! {
    /// Legal case lifecycle status.
    CaseStatus {
        Active = 1,
        Suspended = 2,
        Closed = 3,
        Archived = 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_job_status_ids_match_seed_data() {
        assert_eq!(ImportJobStatus::Pending.id(), 1);
        assert_eq!(ImportJobStatus::Analyzing.id(), 2);
        assert_eq!(ImportJobStatus::Admitted.id(), 3);
        assert_eq!(ImportJobStatus::Running.id(), 4);
        assert_eq!(ImportJobStatus::Completed.id(), 5);
        assert_eq!(ImportJobStatus::Failed.id(), 6);
    }

    #[test]
    fn case_status_ids_match_seed_data() {
        assert_eq!(CaseStatus::Active.id(), 1);
        assert_eq!(CaseStatus::Suspended.id(), 2);
        assert_eq!(CaseStatus::Closed.id(), 3);
        assert_eq!(CaseStatus::Archived.id(), 4);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = ImportJobStatus::Pending.into();
        assert_eq!(id, 1);
    }

    #[test]
    fn import_job_status_round_trips_through_id() {
        for status in [
            ImportJobStatus::Pending,
            ImportJobStatus::Analyzing,
            ImportJobStatus::Admitted,
            ImportJobStatus::Running,
            ImportJobStatus::Completed,
            ImportJobStatus::Failed,
        ] {
            assert_eq!(ImportJobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(ImportJobStatus::from_id(0), None);
        assert_eq!(ImportJobStatus::from_id(7), None);
    }

    #[test]
    fn import_job_status_names_match_seed_data() {
        assert_eq!(ImportJobStatus::Pending.name(), "pending");
        assert_eq!(ImportJobStatus::Failed.name(), "failed");
    }
}
