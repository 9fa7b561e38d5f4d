//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - Mock 探测端到端测试（无需真实相机文件）
//! - 目录 → 对齐 → 编码 全链路测试

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;

    use align_engine::AlignEngine;
    use chrono::{NaiveDate, NaiveDateTime};
    use contracts::{AlignConfig, Catalog};
    use ingestion::{CatalogBuilder, MockProbe};
    use observability::AlignMetricsAggregator;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    /// End-to-end test: source folders -> catalogs -> offsets -> batches
    ///
    /// 验证完整的对齐流程：
    /// 1. CatalogBuilder 过滤欠曝帧并建立目录
    /// 2. 首帧锚点标定时钟偏移
    /// 3. 逐级放宽容差完成跨源匹配
    #[test]
    fn test_e2e_mock_alignment() {
        let root = tempfile::tempdir().unwrap();
        let cam1 = root.path().join("1");
        let cam2 = root.path().join("2");
        fs::create_dir(&cam1).unwrap();
        fs::create_dir(&cam2).unwrap();

        touch(
            &cam1,
            &["IMG_0001.JPG", "IMG_0002.JPG", "IMG_0003.JPG", "IMG_0004.JPG"],
        );
        touch(&cam2, &["DSC00010.JPG", "DSC00011.JPG", "DSC00012.JPG"]);

        // cam2's clock runs 2s behind cam1; its middle frame is
        // underexposed, and cam1's last frame has no parseable timestamp.
        // Neither may surface in any batch.
        let probe = MockProbe::new()
            .with_frame("IMG_0001.JPG", 400, ts(10, 0, 0))
            .with_frame("IMG_0002.JPG", 420, ts(10, 0, 5))
            .with_frame("IMG_0003.JPG", 410, ts(10, 0, 10))
            .with_untimed_frame("IMG_0004.JPG", 430)
            .with_frame("DSC00010.JPG", 380, ts(9, 59, 58))
            .with_frame("DSC00011.JPG", 8, ts(10, 0, 3)) // underexposed
            .with_frame("DSC00012.JPG", 390, ts(10, 0, 8));

        let builder = CatalogBuilder::new(probe, 30);
        let (catalog1, stats1) = builder.build("cam1".into(), 0, &cam1).unwrap();
        let (catalog2, stats2) = builder.build("cam2".into(), 1, &cam2).unwrap();

        assert_eq!(stats1.accepted, 3);
        assert_eq!(stats1.skipped_unreadable, 1);
        assert_eq!(stats2.accepted, 2);
        assert_eq!(stats2.skipped_underexposed, 1);

        let catalogs = vec![catalog1, catalog2];
        let engine = AlignEngine::new(&AlignConfig::default());
        let batches = engine.align(&catalogs).unwrap();

        assert_eq!(batches.len(), 3);

        // Batch order follows reference timestamps
        for window in batches.windows(2) {
            assert!(window[0].reference.timestamp <= window[1].reference.timestamp);
        }

        // Offset +2s lines cam2's surviving frames up with the reference:
        // 09:59:58 -> 10:00:00 and 10:00:08 -> 10:00:10 exactly
        assert_eq!(batches[0].matched.len(), 1);
        assert_eq!(batches[0].matched[0].timestamp, ts(9, 59, 58));
        assert_eq!(batches[0].meta.tolerance_used_s.get("cam2"), Some(&0));

        // The underexposed frame at 10:00:03 (normalized 10:00:05) would
        // have matched the second reference capture; without it cam2 has
        // nothing near 10:00:05
        assert!(batches[1].matched.is_empty());
        assert_eq!(batches[1].meta.unmatched_sources.len(), 1);

        assert_eq!(batches[2].matched.len(), 1);
        assert_eq!(batches[2].matched[0].timestamp, ts(10, 0, 8));

        // The skipped frames never appear in any batch
        for batch in &batches {
            for capture in batch.frames() {
                assert_ne!(capture.file.file_name().unwrap(), "DSC00011.JPG");
                assert_ne!(capture.file.file_name().unwrap(), "IMG_0004.JPG");
            }
        }
    }

    /// 验证欠曝过滤不变量：目录中不存在低于阈值的帧
    #[test]
    fn test_catalog_never_holds_underexposed_captures() {
        let root = tempfile::tempdir().unwrap();
        let cam = root.path().join("1");
        fs::create_dir(&cam).unwrap();
        touch(&cam, &["IMG_0001.JPG", "IMG_0002.JPG", "IMG_0003.JPG"]);

        let dark_files = ["IMG_0002.JPG"];
        let probe = MockProbe::new()
            .with_frame("IMG_0001.JPG", 31, ts(10, 0, 0))
            .with_frame("IMG_0002.JPG", 29, ts(10, 0, 1))
            .with_frame("IMG_0003.JPG", 765, ts(10, 0, 2));

        let builder = CatalogBuilder::new(probe, 30);
        let (catalog, _) = builder.build("cam1".into(), 0, &cam).unwrap();

        assert_eq!(catalog.len(), 2);
        for capture in catalog.iter() {
            let name = capture.file.file_name().unwrap().to_str().unwrap();
            assert!(!dark_files.contains(&name));
        }
    }

    /// End-to-end test: catalogs -> batches -> looping GIFs
    ///
    /// 真实 PNG 帧 + Mock 时间戳，验证编码产物。
    #[test]
    fn test_e2e_encode_batches() {
        use gif_encoder::{EncoderConfig, SequenceEncoder};
        use image::{Rgb, RgbImage};

        let root = tempfile::tempdir().unwrap();
        let cam1 = root.path().join("1");
        let cam2 = root.path().join("2");
        fs::create_dir(&cam1).unwrap();
        fs::create_dir(&cam2).unwrap();

        let colors: [[u8; 3]; 4] = [
            [220, 40, 40],
            [40, 220, 40],
            [40, 40, 220],
            [220, 220, 40],
        ];
        let names1 = ["IMG_0001.png", "IMG_0002.png"];
        let names2 = ["IMG_0101.png", "IMG_0102.png"];
        for (i, name) in names1.iter().chain(names2.iter()).enumerate() {
            let dir = if i < 2 { &cam1 } else { &cam2 };
            RgbImage::from_pixel(8, 6, Rgb(colors[i]))
                .save(dir.join(name))
                .unwrap();
        }

        let probe = MockProbe::new()
            .with_frame("IMG_0001.png", 300, ts(10, 0, 0))
            .with_frame("IMG_0002.png", 300, ts(10, 0, 5))
            .with_frame("IMG_0101.png", 300, ts(10, 0, 0))
            .with_frame("IMG_0102.png", 300, ts(10, 0, 5));

        let builder = CatalogBuilder::new(probe, 30);
        let catalogs: Vec<Catalog> = vec![
            builder.build("cam1".into(), 0, &cam1).unwrap().0,
            builder.build("cam2".into(), 1, &cam2).unwrap().0,
        ];

        let engine = AlignEngine::new(&AlignConfig::default());
        let batches = engine.align(&catalogs).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.is_fully_matched(2)));

        let out_dir = root.path().join("output");
        let mut encoder = SequenceEncoder::new(EncoderConfig::default());
        let mut aggregator = AlignMetricsAggregator::new();

        for batch in &batches {
            let path = encoder.encode_batch(batch, &out_dir).unwrap();
            assert!(path.is_file());
            aggregator.update(&batch.meta, batch.contributing_sources(), catalogs.len());
        }

        assert!(out_dir.join("0000.gif").is_file());
        assert!(out_dir.join("0001.gif").is_file());

        // Each GIF loops two frames forward and the same two backward
        let mut decoder = gif::DecodeOptions::new()
            .read_info(fs::File::open(out_dir.join("0000.gif")).unwrap())
            .unwrap();
        let mut frames = 0;
        while decoder.read_next_frame().unwrap().is_some() {
            frames += 1;
        }
        assert_eq!(frames, 4);

        let summary = aggregator.summary();
        assert_eq!(summary.total_batches, 2);
        assert_eq!(summary.fully_matched, 2);
    }

    /// 配置内容哈希区分不同配置的断点记录
    #[test]
    fn test_resume_digest_tracks_config_content() {
        use config_loader::ConfigLoader;
        use contracts::minimal_blueprint;
        use gif_encoder::config_digest;

        let a = minimal_blueprint("/data/shoot", &[("cam1", "1"), ("cam2", "2")]);
        let mut b = a.clone();
        b.align.tolerance_steps_s = vec![0, 1];

        let digest_a = config_digest(&ConfigLoader::to_toml(&a).unwrap());
        let digest_a2 = config_digest(&ConfigLoader::to_toml(&a).unwrap());
        let digest_b = config_digest(&ConfigLoader::to_toml(&b).unwrap());

        assert_eq!(digest_a, digest_a2);
        assert_ne!(digest_a, digest_b);
    }
}
