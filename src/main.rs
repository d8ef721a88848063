use stress_test::{stress_test_roundtrip, stress_test_scaling, stress_test_shared_cache};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async_main());
}

async fn async_main() {
    // Run async stress tests
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            TRANSCODING STRESS TESTS                         ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: many small blocks
    let stats = stress_test_roundtrip(200, 16, 1).await;
    stats.print();

    // Test 2: fewer, larger blocks
    let stats = stress_test_roundtrip(50, 400, 2).await;
    stats.print();

    // Test 3: cache reuse across roots
    let stats = stress_test_shared_cache(100, 64, 3).await;
    stats.print();

    // Test 4: Scaling analysis
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS                                  ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(2000, 250).await;

    println!("\n✓ All stress tests completed successfully!");
}
