use std::sync::mpsc::channel;

fn main() {
    // no explicit initialization: the first call loads $RINGLOG_CONFIG_PATH
    // or falls back to the built-in parameters
    ringlog::logger_config().with_run_id("threads-demo").init_global();
    ringlog::info!("Hello, world!");

    let (handles, senders): (Vec<_>, Vec<_>) = (0..5)
        .map(|i| {
            let (sender, receiver) = channel::<&'static str>();
            (
                std::thread::spawn(move || {
                    for message in receiver {
                        ringlog::warn!("thread {i} received: {message}");
                    }
                }),
                sender,
            )
        })
        .unzip();
    for sender in senders {
        sender.send("Hello, world!").unwrap();
    }
    for handle in handles {
        handle.join().unwrap();
    }
    // the `log` facade lands in the same sinks
    log::error!("done, all threads joined");
}
