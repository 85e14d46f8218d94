use btechverse_core::models::StudentCount;
use btechverse_core::AppError;
use btechverse_db::{StudentCounterRepository, STUDENTS_COUNTER};
use std::sync::Arc;

/// Counts distinct student visits.
#[derive(Clone)]
pub struct StudentService {
    counters: Arc<dyn StudentCounterRepository>,
}

impl StudentService {
    pub fn new(counters: Arc<dyn StudentCounterRepository>) -> Self {
        Self { counters }
    }

    /// Count a new visitor and return the updated total.
    pub async fn record_student_visit(&self) -> Result<StudentCount, AppError> {
        let count = self.counters.increment(STUDENTS_COUNTER).await?;
        tracing::debug!(count, "Student visit recorded");
        Ok(StudentCount::new(count))
    }

    pub async fn student_count(&self) -> Result<StudentCount, AppError> {
        Ok(StudentCount::new(
            self.counters.get(STUDENTS_COUNTER).await?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btechverse_db::test_helpers::InMemoryCounterRepository;

    #[tokio::test]
    async fn test_visits_accumulate() {
        let service = StudentService::new(Arc::new(InMemoryCounterRepository::new()));
        assert_eq!(service.student_count().await.unwrap().count, 0);

        service.record_student_visit().await.unwrap();
        let latest = service.record_student_visit().await.unwrap();
        assert_eq!(latest.count, 2);
        assert_eq!(latest.formatted, "2");
        assert_eq!(service.student_count().await.unwrap(), latest);
    }
}
