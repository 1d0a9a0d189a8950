//! Submits a two-step process chain to a live actinia instance and polls it.
//!
//! ```text
//! ACTINIA_URL=https://actinia.mundialis.de ACTINIA_USER=... ACTINIA_PASSWORD=... \
//!     cargo run --example run_chain -- nc_spm_08 user1
//! ```
//!
//! This demonstrates:
//! - Looking modules up in the registry
//! - Binding one parameter map per module, by position
//! - Polling the job until the service reports a final status

use std::time::Duration;

use actinia_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ActiniaError> {
    let mut args = std::env::args().skip(1);
    let location = args.next().unwrap_or_else(|| "nc_spm_08".to_string());
    let mapset = args.next().unwrap_or_else(|| "user1".to_string());

    let client = Client::from_env()?;

    let Some(region) = client.module("g.region").await? else {
        eprintln!("g.region is not offered by this instance");
        return Ok(());
    };
    let Some(vi) = client.module("i.vi").await? else {
        eprintln!("i.vi is not offered by this instance");
        return Ok(());
    };

    for module in [&region, &vi] {
        let inputs: Vec<_> = module.input_parameters().await?.iter().map(|p| p.name()).collect();
        println!("{}: inputs {:?}", module, inputs);
    }

    let region_params = ParameterMap::from([(
        "raster".to_string(),
        "lsat7_2000_50@landsat,lsat7_2000_61@landsat".to_string(),
    )]);
    let vi_params = ParameterMap::from([
        ("red".to_string(), "lsat7_2000_50@landsat".to_string()),
        ("nir".to_string(), "lsat7_2000_61@landsat".to_string()),
        ("viname".to_string(), "ndvi".to_string()),
        ("output".to_string(), "ndvi".to_string()),
    ]);

    let mut job = client
        .run_process(&location, &mapset, &[region, vi], &[region_params, vi_params])
        .await?;
    println!("Submitted, polling {}", job.url());

    loop {
        match job.refresh().await {
            Ok(status) => println!("status: {}", status),
            Err(e) => eprintln!("poll failed, keeping the last status: {}", e),
        }
        if job.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    Ok(())
}
