use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{Layer, MakeWriter},
    layer,
    registry::LookupSpan,
    Layer as _,
};

use super::LoggingConfiguration;

pub fn build_formatting_layer<S, W>(config: &LoggingConfiguration, writer: W) -> Box<dyn layer::Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    if config.log_format_json {
        Layer::new()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed()
    } else {
        Layer::new()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use tracing::info;
    use tracing_subscriber::{layer::SubscriberExt as _, Registry};

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl CapturedWriter {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedWriter {
        type Writer = CapturedWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(config: &LoggingConfiguration) -> String {
        let writer = CapturedWriter::default();
        let subscriber = Registry::default().with(build_formatting_layer(config, writer.clone()));
        tracing::subscriber::with_default(subscriber, || {
            info!(metric_name = "cpu.usage", "Rejected metric point.");
        });
        writer.contents()
    }

    #[test]
    fn json_format() {
        let config = LoggingConfiguration {
            log_format_json: true,
            ..Default::default()
        };
        let output = capture(&config);

        let line: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert!(line["message"] == "Rejected metric point.");
        assert!(line["metric_name"] == "cpu.usage");
        assert!(line["level"] == "INFO");
    }

    #[test]
    fn human_readable_format() {
        let output = capture(&LoggingConfiguration::default());

        assert!(output.contains("INFO"));
        assert!(output.contains("Rejected metric point."));
        assert!(output.contains("metric_name"));
        assert!(output.ends_with('\n'));
    }
}
