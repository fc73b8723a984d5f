use dagnet::{ActivationKind, DataLoader, Network, NetworkConfig, Role, Trainer};
use ndarray::{arr2, aview1};

const SAMPLES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn xor_network(seed: u64, hidden: usize) -> Network {
    let config = NetworkConfig::default()
        .seed(seed)
        .learning_rate(0.1)
        .activation(ActivationKind::LeakyRelu);
    let mut net = Network::new(config);
    let i1 = net.add_input(Some("N1"), 2).unwrap();
    let i2 = net.add_input(Some("N2"), 2).unwrap();
    let output = net.add_output(Some("OUT")).unwrap();
    for k in 0..hidden {
        let h = net.add_hidden(None).unwrap();
        net.connect_child(i1, h).unwrap();
        net.connect_child(i2, h).unwrap();
        net.connect_child(h, output).unwrap();
        assert_eq!(net.neuron(h).unwrap().weights().len(), 3, "hidden {k}");
    }
    net.build_order().unwrap();
    net
}

fn xor_loader() -> DataLoader {
    let input = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
    let target = arr2(&[[0.0], [1.0], [1.0], [0.0]]);
    DataLoader::new(input, target).unwrap()
}

fn predictions(net: &mut Network) -> Vec<f64> {
    SAMPLES
        .iter()
        .map(|(input, _)| net.forward(aview1(input)).unwrap()[0])
        .collect()
}

#[test]
fn learns_exclusive_or() {
    let mut net = xor_network(0, 2);
    let mut loader = xor_loader();
    let before = Trainer::evaluate(&mut net, &mut loader).unwrap();

    let history = Trainer::new(8000).fit(&mut net, &mut loader).unwrap();
    let after = Trainer::evaluate(&mut net, &mut loader).unwrap();
    let outputs = predictions(&mut net);
    println!(
        "loss {} -> {}, outputs {:?}, last epoch {:?}",
        before,
        after,
        outputs,
        history.last()
    );

    assert!(after < before / 4.0, "loss went from {before} to {after}");
    for (output, (input, target)) in outputs.iter().zip(SAMPLES.iter()) {
        assert!(
            (output - target).abs() < 0.2,
            "{:?} -> {} (expected {})",
            input,
            output,
            target
        );
    }
}

#[test]
fn online_updates_move_output_and_hidden_neurons() {
    let mut net = xor_network(1, 2);
    let before: Vec<_> = net
        .neurons()
        .map(|(_, neuron)| neuron.weights().to_owned())
        .collect();

    net.train_sample(aview1(&[1.0, 0.0]), aview1(&[1.0])).unwrap();

    let moved: Vec<_> = net
        .neurons()
        .zip(before)
        .filter(|((_, neuron), weights)| neuron.weights() != *weights)
        .map(|((_, neuron), _)| neuron.role())
        .collect();
    assert!(moved.contains(&Role::Output), "output did not move");
    assert!(moved.contains(&Role::Hidden), "no hidden neuron moved");

    for (_, neuron) in net.neurons() {
        if neuron.delta() != 0.0 {
            assert!(neuron.weight_adjustments().iter().any(|&adj| adj != 0.0));
        }
    }
}
