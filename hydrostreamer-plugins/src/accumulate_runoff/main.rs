/*
This code is part of the HydroStreamer river routing tools.
Authors: HydroStreamer developers
Created: 16/10/2026
Last Modified: 16/10/2026
License: MIT
*/

use hydrostreamer_common::configs::get_configs;
use hydrostreamer_common::utils::{get_formatted_elapsed_time, print_welcome};
use hydrostreamer_routing::units::catchment_depth_to_flow;
use hydrostreamer_routing::{
    accumulate_runoff, read_network, write_network, ConstantVelocity, LagPolicy, RoutingMethod,
    TopologyOptions,
};
use std::io::{Error, ErrorKind};
use std::time::Instant;
use std::{env, path};

/// This tool routes the runoff attached to each segment of a river network
/// downstream, producing a discharge series per segment (`--output`). The
/// input (`--input`) is a JSON segment collection. When the collection
/// carries `NEXT`/`PREVIOUS` links these are used as the network topology;
/// otherwise the topology is derived from the line geometry, joining the end
/// of each line to any line starting within the snap distance (`--snap`).
///
/// Two routing methods are available (`--method`). `instant` adds all
/// upstream flow within the same timestep. `constant` delays upstream flow by
/// the travel time through each reach, using segment velocities or the
/// network-wide `--velocity` (m/s). Travel times that are not a whole number
/// of timesteps are placed according to `--lag` (`linear`, `nearest` or
/// `floor`).
///
/// With `--depth`, runoff is read as millimetres per timestep and converted
/// to m3/s using the catchment polygon areas before routing.
fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() <= 1 || args[1].trim() == "help" {
        // print help
        help();
        return;
    }

    if args[1].trim() == "run" {
        match run(&args) {
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args[1].trim() == "version" {
        // print version information
        version();
    }
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("accumulate_runoff{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = r#"
    accumulate_runoff Help

    This tool routes segment runoff downstream through a river network.

    The following commands are recognized:
    help       Prints help information.
    run        Runs the tool.
    version    Prints the tool version information.

    The following flags can be used with the 'run' command:
    -i, --input        Name of the input segment collection (JSON).
    -o, --output       Name of the output segment collection (JSON).
    --method           Routing method; 'instant' (default) or 'constant'.
    --velocity         Flow velocity (m/s) for segments without their own.
    --lag              Fractional lag handling; 'linear' (default), 'nearest' or 'floor'.
    --snap             Snap distance used to join line ends, in xy units.
    --depth            Runoff is given in mm per timestep over catchment polygons.

    Input/output file names can be fully qualified, or can rely on the
    working directory contained in the settings.json file.

    Example Usage:
    >> .*EXE_NAME run --input=rivers.json -o=routed.json --method=constant --velocity=1.0
    "#
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "accumulate_runoff v{} by the HydroStreamer developers.",
        VERSION.unwrap_or("Unknown version")
    );
}

fn get_tool_name() -> String {
    String::from("AccumulateRunoff") // This should be camel case and is a reference to the tool name.
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, Error> {
    value.trim().parse::<T>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Error parsing {} value '{}'", flag, value),
        )
    })
}

fn run(args: &Vec<String>) -> Result<(), Error> {
    let tool_name = get_tool_name();

    // Read in the environment variables and get the necessary values
    let configurations = get_configs()?;

    let mut input_file = String::new();
    let mut output_file = String::new();
    let mut method = String::from("instant");
    let mut velocity: Option<f64> = None;
    let mut lag = LagPolicy::default();
    let mut snap_distance: Option<f64> = None;
    let mut depth = false;

    // read the arguments
    if args.len() <= 2 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Tool run with no parameters.",
        ));
    }
    for i in 0..args.len() {
        let arg = args[i].replace("\"", "").replace("\'", "");
        let vec = arg.split("=").collect::<Vec<&str>>(); // in case an equals sign was used
        let keyval = vec.len() > 1;
        let flag_val = vec[0].to_lowercase().replace("--", "-");
        let value = if keyval {
            vec[1].to_string()
        } else {
            args.get(i + 1).cloned().unwrap_or_default()
        };
        if flag_val == "-i" || flag_val == "-input" {
            input_file = value;
        } else if flag_val == "-o" || flag_val == "-output" {
            output_file = value;
        } else if flag_val == "-method" {
            method = value.to_lowercase();
        } else if flag_val == "-velocity" {
            velocity = Some(parse_value(&flag_val, &value)?);
        } else if flag_val == "-lag" {
            lag = value
                .parse::<LagPolicy>()
                .map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;
        } else if flag_val == "-snap" {
            snap_distance = Some(parse_value(&flag_val, &value)?);
        } else if flag_val == "-depth" {
            depth = !keyval || value.to_lowercase().contains("true");
        }
    }

    if input_file.is_empty() || output_file.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "Both an input (--input) and an output (-o) file must be specified.",
        ));
    }

    let method = match method.as_str() {
        "instant" => RoutingMethod::Instant,
        "constant" => RoutingMethod::Constant(ConstantVelocity { velocity, lag }),
        other => {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unrecognized routing method '{}'.", other),
            ))
        }
    };

    if configurations.verbose_mode {
        print_welcome(&tool_name);
    }

    let mut num_procs = num_cpus::get() as isize;
    let max_procs = configurations.max_procs;
    if max_procs > 0 && max_procs < num_procs {
        num_procs = max_procs;
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_procs as usize)
        .build_global()
        .map_err(|e| Error::new(ErrorKind::Other, e))?;

    let start = Instant::now();

    let input_file = configurations.resolve_path(&input_file);
    let output_file = configurations.resolve_path(&output_file);

    if configurations.verbose_mode {
        println!("Reading data...")
    };
    let mut network = read_network(&input_file)?;

    if depth {
        network = network.map_segments(catchment_depth_to_flow)?;
    }

    if !network.has_topology() {
        let options = match snap_distance {
            Some(d) => TopologyOptions::with_snap_distance(d),
            None => TopologyOptions::default(),
        };
        network = network.build_topology(&options)?;
    }
    if configurations.verbose_mode {
        println!(
            "Routing {} segments ({} outlets)...",
            network.len(),
            network.outlets()?.len()
        );
    }

    let routed = accumulate_runoff(&network, &method)?;

    if configurations.verbose_mode {
        println!("Saving data...")
    };
    write_network(&routed, &output_file)?;

    let elapsed_time = get_formatted_elapsed_time(start);
    if configurations.verbose_mode {
        println!("Output file written: {}", output_file.display());
        println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
    }

    Ok(())
}
