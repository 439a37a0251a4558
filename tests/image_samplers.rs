use rs_sampling::core::pbrt::Float;
use rs_sampling::core::random::{BitstreamRandom, UniformRandom};
use rs_sampling::core::sampler::{
    make_halton_image_sampler, make_random_image_sampler, make_sobol_image_sampler,
    make_stratified_image_sampler, ImageSampler, SamplerKind,
};
use rs_sampling::core::sequence::LowDiscrepancySequence;
use rs_sampling::samplers::halton::HaltonSequence;
use rs_sampling::samplers::lowdiscrepancy::LowDiscrepancyImageSampler;
use rs_sampling::samplers::sobol::{Scrambler, SobolSequence};

fn all_samplers(n: u16) -> Vec<ImageSampler> {
    vec![
        make_halton_image_sampler(u32::from(n) * u32::from(n)),
        make_sobol_image_sampler(u32::from(n) * u32::from(n), Scrambler::None),
        make_sobol_image_sampler(u32::from(n) * u32::from(n), Scrambler::FastOwen),
        make_stratified_image_sampler(n, n, true),
        make_stratified_image_sampler(n, n, false),
        make_random_image_sampler(u32::from(n) * u32::from(n)),
    ]
}

fn count(sampler: &mut ImageSampler, dims: (usize, usize), pixel: (usize, usize), lens: bool) -> u32 {
    let mut rng = BitstreamRandom::default();
    sampler.start_pixel(dims, pixel);
    let mut n = 0;
    while let Some(sample) = sampler.next_sample(lens, &mut rng) {
        assert_eq!(sample.lens_uv.is_some(), lens);
        n += 1;
    }
    n
}

#[test]
fn every_sampler_produces_the_requested_count() {
    for mut sampler in all_samplers(3) {
        assert_eq!(sampler.samples_per_pixel(), 9);
        assert_eq!(count(&mut sampler, (40, 30), (39, 29), false), 9);
        assert_eq!(count(&mut sampler, (40, 30), (0, 0), true), 9);
    }
}

#[test]
fn zero_samples_is_immediately_exhausted() {
    for mut sampler in all_samplers(0) {
        assert_eq!(count(&mut sampler, (8, 8), (1, 1), false), 0);
    }
}

#[test]
fn largest_counts_do_not_crash() {
    let mut samplers = vec![
        make_halton_image_sampler(u32::MAX),
        make_sobol_image_sampler(u32::MAX, Scrambler::FastOwen),
        make_stratified_image_sampler(u16::MAX, u16::MAX, true),
        make_random_image_sampler(u32::MAX),
    ];
    let mut rng = BitstreamRandom::default();
    for sampler in samplers.iter_mut() {
        sampler.start_pixel((3, 3), (2, 2));
        for _ in 0..10 {
            let sample = sampler.next_sample(true, &mut rng).unwrap();
            assert!(sample.weight > 0.0);
        }
    }
}

#[test]
fn samples_lie_in_their_pixel() {
    let mut rng = BitstreamRandom::default();
    for mut sampler in all_samplers(4) {
        for (dims, pixel) in [((2, 2), (1, 1)), ((2, 2), (0, 0)), ((100, 3), (57, 2))].iter() {
            sampler.start_pixel(*dims, *pixel);
            while let Some(sample) = sampler.next_sample(true, &mut rng) {
                let x0 = pixel.0 as Float / dims.0 as Float;
                let x1 = (pixel.0 + 1) as Float / dims.0 as Float;
                let y0 = pixel.1 as Float / dims.1 as Float;
                let y1 = (pixel.1 + 1) as Float / dims.1 as Float;
                let uv = sample.image_uv;
                assert!(uv.x >= x0 && uv.x <= x1 && uv.x < 1.0);
                assert!(uv.y >= y0 && uv.y <= y1 && uv.y < 1.0);
                assert!(!uv.has_nans() && !sample.image_uv_footprint.has_nans());
                let lens = sample.lens_uv.unwrap();
                assert!(lens.x >= 0.0 && lens.x < 1.0 && lens.y >= 0.0 && lens.y < 1.0);
            }
        }
    }
}

#[test]
fn halton_stops_early_beyond_capacity() {
    // 2^26 is beyond the Halton resolution limit, so no sample at all
    let mut halton = make_halton_image_sampler(4);
    assert_eq!(count(&mut halton, (1 << 26, 1), (0, 0), false), 0);
    // the Sobol' sampler still has one sample per pixel there
    let mut sobol = make_sobol_image_sampler(4, Scrambler::FastOwen);
    assert_eq!(count(&mut sobol, (1 << 26, 1), (0, 0), false), 1);
}

#[test]
fn sobol_replicas_differ_only_in_scrambled_dimensions() {
    let mut master = LowDiscrepancyImageSampler::new(
        LowDiscrepancySequence::Sobol(SobolSequence::new(Scrambler::FastOwen)),
        16,
    );
    let mut first = master.replicate();
    let mut second = master.replicate();
    for (dims, pixel, index) in [((64, 64), (5, 6), 0), ((255, 255), (200, 13), 7)].iter() {
        assert!(first.sequence.start(*dims, *pixel, *index));
        assert!(second.sequence.start(*dims, *pixel, *index));
        assert_eq!(first.sequence.next(), second.sequence.next());
        assert_eq!(first.sequence.next(), second.sequence.next());
        assert_ne!(first.sequence.next(), second.sequence.next());
    }
}

#[test]
fn image_sampler_replicas_keep_their_kind() {
    for mut sampler in all_samplers(2) {
        let mut replica = sampler.replicate();
        assert_eq!(replica.kind(), sampler.kind());
        assert_eq!(replica.samples_per_pixel(), 4);
        assert_eq!(count(&mut replica, (16, 16), (3, 3), false), 4);
    }
    assert_eq!(make_halton_image_sampler(1).kind(), SamplerKind::Halton);
}

#[test]
fn halton_replicas_are_identical() {
    let mut master = make_halton_image_sampler(8);
    let mut a = master.replicate();
    let mut b = master.replicate();
    let mut rng_a = BitstreamRandom::default();
    let mut rng_b = BitstreamRandom::default();
    a.start_pixel((32, 32), (9, 9));
    b.start_pixel((32, 32), (9, 9));
    while let Some(sa) = a.next_sample(false, &mut rng_a) {
        let sa_uv = sa.image_uv;
        let extra_a = sa.rng.next_geometric();
        let sb = b.next_sample(false, &mut rng_b).unwrap();
        assert_eq!(sa_uv, sb.image_uv);
        assert_eq!(extra_a, sb.rng.next_geometric());
    }
}

#[test]
fn low_discrepancy_weights() {
    for sequence in [
        LowDiscrepancySequence::Halton(HaltonSequence::new()),
        LowDiscrepancySequence::Sobol(SobolSequence::new(Scrambler::None)),
    ]
    .iter()
    {
        let mut sequence = sequence.duplicate();
        assert!(sequence.start((255, 255), (1, 1), 0));
        assert_eq!(sequence.sample_weight(1), 1.0);
        assert_eq!(sequence.sample_weight(2), 0.5);
    }
}
