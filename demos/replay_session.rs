//! Run a short synthetic session and print the hand-off payload

use session_signals::encoder::StressLogEncoder;
use session_signals::landmarks::FULL_BODY_LANDMARKS;
use session_signals::{Landmark, PoseFrame, QuestionEvent, SessionMonitor};

fn main() {
    let mut monitor = SessionMonitor::new();
    monitor.start(0);

    for k in 0..150u64 {
        // Client settles for two seconds, then starts rocking
        let sway = if k > 60 && k % 2 == 1 { 0.03 } else { 0.0 };
        let frame = PoseFrame::from_landmarks(vec![
            Landmark::new(0.5 + sway, 0.5, 0.9);
            FULL_BODY_LANDMARKS
        ]);
        let now_ms = k * 1000 / 30;

        if let Err(e) = monitor.process_frame(&frame, now_ms) {
            eprintln!("Error: {e:?}");
            return;
        }
        if k == 75 {
            if let Err(e) = monitor.question_asked(&QuestionEvent::new("q-demo", now_ms)) {
                eprintln!("Error: {e:?}");
                return;
            }
        }
    }

    let Some(log) = monitor.stop() else {
        eprintln!("Error: session was not running");
        return;
    };

    match StressLogEncoder::new().encode_to_json(&log) {
        Ok(json) => print!("{json}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
