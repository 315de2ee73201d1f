use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::{AnalysisEvent, AnalysisResult};
use crate::services::client::AnalysisClient;
use crate::services::extractor::{build_result, fallback_result};

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Последовательный анализ списка тикеров: один вызов модели за раз,
/// результат и прогресс отдаются сразу после обработки каждого тикера.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    client: Arc<dyn AnalysisClient>,
}

impl AnalysisOrchestrator {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        AnalysisOrchestrator { client }
    }

    /// Анализ одного тикера. Ошибка внешнего вызова превращается в результат-заглушку.
    pub async fn analyze_ticker(&self, ticker: &str) -> AnalysisResult {
        match self.client.analyze(ticker).await {
            Ok(raw) => {
                tracing::debug!("Получен ответ модели для {} ({} символов)", ticker, raw.text.len());
                build_result(ticker, &raw)
            }
            Err(e) => {
                tracing::warn!("Ошибка анализа {}: {}", ticker, e);
                fallback_result(ticker)
            }
        }
    }

    /// Поток событий: для каждого тикера сначала Result, затем Progress((i+1)/N).
    /// Следующий тикер запрашивается только когда потребитель читает поток дальше.
    pub fn stream(&self, tickers: Vec<String>) -> impl Stream<Item = AnalysisEvent> + Send + 'static {
        let total = tickers.len();
        let this = self.clone();

        stream::iter(tickers.into_iter().enumerate())
            .then(move |(index, ticker)| {
                let this = this.clone();
                async move {
                    let result = this.analyze_ticker(&ticker).await;
                    (result, progress_fraction(index + 1, total))
                }
            })
            .flat_map(|(result, progress)| {
                stream::iter([AnalysisEvent::Result(result), AnalysisEvent::Progress(progress)])
            })
    }

    /// Прогоняет весь список, отправляя события в канал.
    /// Возвращает число обработанных тикеров. Если получатель закрыт, прогон останавливается.
    pub async fn run(&self, tickers: &[String], events: mpsc::Sender<AnalysisEvent>) -> usize {
        if tickers.is_empty() {
            return 0;
        }

        tracing::info!("Начинаем анализ {} тикеров", tickers.len());

        let mut completed = 0;
        let mut stream = Box::pin(self.stream(tickers.to_vec()));
        while let Some(event) = stream.next().await {
            if matches!(event, AnalysisEvent::Result(_)) {
                completed += 1;
            }
            if events.send(event).await.is_err() {
                tracing::warn!(
                    "Получатель событий закрыт, анализ остановлен после {} из {} тикеров",
                    completed,
                    tickers.len()
                );
                return completed;
            }
        }

        tracing::info!("Анализ завершен: {} тикеров", completed);
        completed
    }

    /// Запускает прогон в отдельной задаче и возвращает канал событий
    pub fn spawn(&self, tickers: Vec<String>) -> mpsc::Receiver<AnalysisEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let this = self.clone();
        tokio::spawn(async move {
            this.run(&tickers, tx).await;
        });
        rx
    }

    /// Все результаты прогона одним списком, в порядке запроса
    pub async fn collect(&self, tickers: &[String]) -> Vec<AnalysisResult> {
        self.stream(tickers.to_vec())
            .filter_map(|event| async move {
                match event {
                    AnalysisEvent::Result(result) => Some(result),
                    AnalysisEvent::Progress(_) => None,
                }
            })
            .collect()
            .await
    }
}

pub fn progress_fraction(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(0, 0), 0.0);
        assert_eq!(progress_fraction(1, 4), 0.25);
        assert_eq!(progress_fraction(3, 3), 1.0);
    }
}
