mod common;

use embassy_futures::block_on;
use embassy_futures::join::{join, join4};
use embassy_time::{Duration, Instant, Timer};

use common::{MockButton, MockLed, Presses};
use ledrelay::channels::Pipeline;
use ledrelay::config::{ConsumerConfig, ProducerConfig, SupervisorConfig};
use ledrelay::consumer::ConsumerTask;
use ledrelay::error::Timeout;
use ledrelay::producer::{ProducerTask, SendPolicy};
use ledrelay::signal::SignalMode;
use ledrelay::stimulus::{Edge, StimulusTask};
use ledrelay::supervisor::{AppSupervisor, Outcome};
use ledrelay::types::OutputState;

fn fast_producer() -> ProducerConfig {
    ProducerConfig {
        settle_delay: Duration::from_millis(2),
        send_policy: SendPolicy::Strict,
    }
}

#[test]
fn two_presses_toggle_and_mirror_with_default_delay() {
    let pipeline: Pipeline = Pipeline::new(SignalMode::Binary);
    let led_a = MockLed::low();
    let led_b = MockLed::low();
    let mut producer = ProducerTask::new(&pipeline, led_a.clone(), ProducerConfig::default());
    let mut consumer = ConsumerTask::new(&pipeline, led_b.clone(), ConsumerConfig::default());
    let interrupt = pipeline.poster();

    block_on(async {
        interrupt.post();
        let started = Instant::now();
        let (published, applied) = join(producer.cycle(), consumer.cycle()).await;
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(published, Ok(OutputState::High));
        assert_eq!(applied, Ok(OutputState::High));
        assert!(led_a.is_high());
        assert!(led_b.is_high());

        interrupt.post();
        let (published, applied) = join(producer.cycle(), consumer.cycle()).await;
        assert_eq!(published, Ok(OutputState::Low));
        assert_eq!(applied, Ok(OutputState::Low));
    });

    assert!(!led_a.is_high());
    assert!(!led_b.is_high());
    let stats = pipeline.stats();
    assert_eq!(stats.handoff.sent, 2);
    assert_eq!(stats.handoff.received, 2);
    assert_eq!(stats.signal.posts, 2);
}

#[test]
fn supervised_pipeline_mirrors_every_press() {
    const PRESSES: u32 = 5;

    let pipeline: Pipeline = Pipeline::new(SignalMode::Binary);
    let supervisor = AppSupervisor::new(&pipeline, SupervisorConfig::default());
    let presses = Presses::new();
    let led_a = MockLed::low();
    let led_b = MockLed::low();

    let mut stimulus = StimulusTask::new(MockButton::new(&presses), Edge::Falling, pipeline.poster());
    let mut producer = ProducerTask::new(&pipeline, led_a.clone(), fast_producer());
    let mut consumer = ConsumerTask::new(&pipeline, led_b.clone(), ConsumerConfig::default());

    let script = async {
        for press in 1..=PRESSES {
            presses.try_send(()).unwrap();
            while pipeline.states.stats().received < press {
                Timer::after(Duration::from_millis(1)).await;
            }
            assert_eq!(led_b.is_high(), press % 2 == 1);
            assert_eq!(led_a.is_high(), led_b.is_high());
        }
        supervisor.request_shutdown();
    };

    let (s, p, c, ()) = block_on(join4(
        supervisor.run(&mut stimulus),
        supervisor.run(&mut producer),
        supervisor.run(&mut consumer),
        script,
    ));
    assert_eq!((s, p, c), (Outcome::Stopped, Outcome::Stopped, Outcome::Stopped));

    let stats = pipeline.stats();
    assert_eq!(stats.signal.posts, PRESSES);
    assert_eq!(stats.signal.coalesced, 0);
    assert_eq!(stats.handoff.sent, PRESSES);
    assert_eq!(stats.handoff.received, PRESSES);
    assert_eq!(led_b.writes(), PRESSES);
    assert_eq!(supervisor.status().faults, 0);
}

#[test]
fn burst_of_presses_coalesces_into_one_update() {
    let pipeline: Pipeline = Pipeline::new(SignalMode::Binary);
    let led_a = MockLed::low();
    let mut producer = ProducerTask::new(&pipeline, led_a.clone(), fast_producer());
    let interrupt = pipeline.poster();

    for _ in 0..3 {
        interrupt.post();
    }
    assert_eq!(block_on(producer.cycle()), Ok(OutputState::High));

    // nothing left to wake the producer
    assert_eq!(
        block_on(pipeline.signal.wait_timeout(Duration::from_millis(20))),
        Err(Timeout)
    );
    assert_eq!(pipeline.states.len(), 1);
    assert_eq!(pipeline.stats().signal.coalesced, 2);
}

#[test]
fn counting_signal_turns_a_burst_into_queued_updates() {
    let pipeline: Pipeline<4> = Pipeline::new(SignalMode::Counting { max: 8 });
    let led_a = MockLed::low();
    let led_b = MockLed::low();
    let mut producer = ProducerTask::new(&pipeline, led_a.clone(), fast_producer());
    let mut consumer = ConsumerTask::new(&pipeline, led_b.clone(), ConsumerConfig::default());
    let interrupt = pipeline.poster();

    for _ in 0..3 {
        interrupt.post();
    }
    let published: Vec<_> = (0..3).map(|_| block_on(producer.cycle()).unwrap()).collect();
    assert_eq!(
        published,
        vec![OutputState::High, OutputState::Low, OutputState::High]
    );

    let applied: Vec<_> = (0..3).map(|_| block_on(consumer.cycle()).unwrap()).collect();
    assert_eq!(applied, published);
    assert!(led_b.is_high());
}

#[test]
fn interrupt_from_another_thread_drives_the_pipeline() {
    static PIPELINE: Pipeline = Pipeline::new(SignalMode::Binary);
    const PRESSES: u32 = 3;

    let led_a = MockLed::low();
    let led_b = MockLed::low();
    let mut producer = ProducerTask::new(&PIPELINE, led_a.clone(), fast_producer());
    let mut consumer = ConsumerTask::new(&PIPELINE, led_b.clone(), ConsumerConfig::default());

    let interrupt = PIPELINE.poster();
    let isr = std::thread::spawn(move || {
        for press in 1..=PRESSES {
            interrupt.post();
            while PIPELINE.states.stats().received < press {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
    });

    block_on(async {
        for _ in 0..PRESSES {
            let (published, applied) = join(producer.cycle(), consumer.cycle()).await;
            assert_eq!(published, applied);
        }
    });
    isr.join().unwrap();

    assert!(led_a.is_high());
    assert!(led_b.is_high());
    assert_eq!(PIPELINE.stats().handoff.received, PRESSES);
}
