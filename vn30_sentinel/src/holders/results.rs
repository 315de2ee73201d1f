use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::errors::{Result, SentinelError};
use crate::models::{AnalysisEvent, AnalysisResult, RunState};

#[derive(Default)]
struct PassState {
    results: Vec<AnalysisResult>,
    progress: f64,
    running_total: Option<usize>,
}

/// Согласованный срез прогона, прочитанный под одной блокировкой
#[derive(Debug, Clone)]
pub struct ResultsSnapshot {
    pub run: RunState,
    pub progress_percent: f64,
    pub results: Vec<AnalysisResult>,
}

/// Результаты текущего прогона. Только добавление; новый прогон заменяет всё целиком.
#[derive(Clone, Default)]
pub struct ResultsHolder {
    pass: Arc<Mutex<PassState>>,
}

impl ResultsHolder {
    pub fn new() -> Self {
        ResultsHolder::default()
    }

    /// Начинает новый прогон на `total` тикеров. Ошибка, если прогон уже идет.
    pub async fn begin(&self, total: usize) -> Result<()> {
        let mut pass = self.pass.lock().await;
        if pass.running_total.is_some() {
            return Err(SentinelError::InvalidRequest(
                "Анализ уже выполняется".to_string(),
            ));
        }
        *pass = PassState {
            results: Vec::with_capacity(total),
            progress: 0.0,
            running_total: Some(total),
        };
        Ok(())
    }

    pub async fn record(&self, event: AnalysisEvent) -> Result<()> {
        let mut pass = self.pass.lock().await;
        match event {
            AnalysisEvent::Result(result) => pass.results.push(result),
            AnalysisEvent::Progress(progress) => {
                // Прогресс не убывает
                pass.progress = pass.progress.max(progress);
            }
        }
        Ok(())
    }

    pub async fn finish(&self) -> Result<()> {
        let mut pass = self.pass.lock().await;
        pass.running_total = None;
        Ok(())
    }

    /// Читает события до закрытия канала, затем переводит прогон в Idle
    pub async fn consume(self, mut events: mpsc::Receiver<AnalysisEvent>) -> Result<()> {
        while let Some(event) = events.recv().await {
            self.record(event).await?;
        }
        self.finish().await
    }

    pub async fn get(&self) -> Result<Vec<AnalysisResult>> {
        let pass = self.pass.lock().await;
        Ok(pass.results.clone())
    }

    pub async fn len(&self) -> Result<usize> {
        let pass = self.pass.lock().await;
        Ok(pass.results.len())
    }

    pub async fn progress_percent(&self) -> Result<f64> {
        let pass = self.pass.lock().await;
        Ok(pass.progress * 100.0)
    }

    pub async fn state(&self) -> Result<RunState> {
        let pass = self.pass.lock().await;
        Ok(pass.run_state())
    }

    pub async fn snapshot(&self) -> Result<ResultsSnapshot> {
        let pass = self.pass.lock().await;
        Ok(ResultsSnapshot {
            run: pass.run_state(),
            progress_percent: pass.progress * 100.0,
            results: pass.results.clone(),
        })
    }
}

impl PassState {
    fn run_state(&self) -> RunState {
        match self.running_total {
            Some(total) => RunState::Running {
                completed: self.results.len(),
                total,
            },
            None => RunState::Idle,
        }
    }
}
