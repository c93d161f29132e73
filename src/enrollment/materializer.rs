use crate::domain::enrollment::EnrollmentRecord;
use crate::store::PaymentStore;
use anyhow::{anyhow, Result};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MaterializedEnrollment {
    pub enrollment: EnrollmentRecord,
    pub created: bool,
}

/// Creates the enrollment row for a (user, course) pair exactly once.
/// Safe under concurrent invocation: the storage-level unique constraint
/// is the final arbiter, an application-level lost race re-fetches and is
/// treated as success.
#[derive(Clone)]
pub struct EnrollmentMaterializer<S> {
    pub store: S,
}

impl<S: PaymentStore + Clone> EnrollmentMaterializer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn ensure_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        payment_id: Option<Uuid>,
    ) -> Result<MaterializedEnrollment> {
        if let Some(existing) = self.store.find_enrollment(user_id, course_id).await? {
            return Ok(MaterializedEnrollment {
                enrollment: existing,
                created: false,
            });
        }

        match self
            .store
            .create_enrollment_if_absent(user_id, course_id, payment_id)
            .await?
        {
            Some(created) => {
                // counter increments only on the insert that actually won
                self.store.increment_enrollment_count(course_id).await?;
                tracing::info!(
                    user_id = %user_id,
                    course_id = %course_id,
                    payment_id = ?payment_id,
                    "enrollment created"
                );
                Ok(MaterializedEnrollment {
                    enrollment: created,
                    created: true,
                })
            }
            None => {
                let existing = self
                    .store
                    .find_enrollment(user_id, course_id)
                    .await?
                    .ok_or_else(|| anyhow!("enrollment missing after duplicate-key race"))?;
                Ok(MaterializedEnrollment {
                    enrollment: existing,
                    created: false,
                })
            }
        }
    }
}
